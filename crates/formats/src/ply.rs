//! Minimal PLY reader for the `/pointcloud` asset.
//!
//! Supports ASCII and binary little-endian payloads with a `vertex` element
//! carrying float positions and optional uchar colors. Elements after the
//! vertex data (faces, etc.) are ignored; this viewer renders points only.

/// Point positions plus optional per-vertex colors, as read from a PLY body.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub positions: Vec<[f32; 3]>,
    pub colors: Option<Vec<[u8; 3]>>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Center of the axis-aligned bounding box, or `None` when empty.
    pub fn bounding_box_center(&self) -> Option<[f32; 3]> {
        let first = *self.positions.first()?;
        let mut min = first;
        let mut max = first;
        for p in &self.positions {
            for axis in 0..3 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        Some([
            (min[0] + max[0]) * 0.5,
            (min[1] + max[1]) * 0.5,
            (min[2] + max[2]) * 0.5,
        ])
    }

    /// Translate the cloud so its bounding-box center lands at the origin.
    /// Returns the center that was subtracted.
    pub fn recenter(&mut self) -> [f32; 3] {
        let Some(center) = self.bounding_box_center() else {
            return [0.0, 0.0, 0.0];
        };
        for p in &mut self.positions {
            p[0] -= center[0];
            p[1] -= center[1];
            p[2] -= center[2];
        }
        center
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlyError {
    NotPly,
    Header(String),
    UnsupportedFormat(String),
    UnsupportedProperty(String),
    MissingVertexElement,
    MissingPosition,
    Truncated,
    BadAscii(String),
}

impl std::fmt::Display for PlyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlyError::NotPly => write!(f, "not a PLY file"),
            PlyError::Header(msg) => write!(f, "bad PLY header: {msg}"),
            PlyError::UnsupportedFormat(fmt) => write!(f, "unsupported PLY format: {fmt}"),
            PlyError::UnsupportedProperty(prop) => {
                write!(f, "unsupported vertex property: {prop}")
            }
            PlyError::MissingVertexElement => write!(f, "no vertex element"),
            PlyError::MissingPosition => write!(f, "vertex element lacks x/y/z"),
            PlyError::Truncated => write!(f, "truncated vertex data"),
            PlyError::BadAscii(msg) => write!(f, "bad ASCII vertex data: {msg}"),
        }
    }
}

impl std::error::Error for PlyError {}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Scalar {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl Scalar {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "uchar" | "uint8" => Some(Scalar::U8),
            "char" | "int8" => Some(Scalar::I8),
            "ushort" | "uint16" => Some(Scalar::U16),
            "short" | "int16" => Some(Scalar::I16),
            "uint" | "uint32" => Some(Scalar::U32),
            "int" | "int32" => Some(Scalar::I32),
            "float" | "float32" => Some(Scalar::F32),
            "double" | "float64" => Some(Scalar::F64),
            _ => None,
        }
    }

    fn size(self) -> usize {
        match self {
            Scalar::U8 | Scalar::I8 => 1,
            Scalar::U16 | Scalar::I16 => 2,
            Scalar::U32 | Scalar::I32 | Scalar::F32 => 4,
            Scalar::F64 => 8,
        }
    }

    fn read_le_f64(self, bytes: &[u8]) -> f64 {
        match self {
            Scalar::U8 => bytes[0] as f64,
            Scalar::I8 => bytes[0] as i8 as f64,
            Scalar::U16 => u16::from_le_bytes([bytes[0], bytes[1]]) as f64,
            Scalar::I16 => i16::from_le_bytes([bytes[0], bytes[1]]) as f64,
            Scalar::U32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            Scalar::I32 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            Scalar::F32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            Scalar::F64 => f64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Format {
    Ascii,
    BinaryLittleEndian,
}

#[derive(Debug)]
struct VertexLayout {
    props: Vec<(String, Scalar)>,
    count: usize,
}

impl VertexLayout {
    fn index_of(&self, name: &str) -> Option<usize> {
        self.props.iter().position(|(n, _)| n == name)
    }

    fn byte_offset(&self, index: usize) -> usize {
        self.props[..index].iter().map(|(_, s)| s.size()).sum()
    }

    fn stride(&self) -> usize {
        self.props.iter().map(|(_, s)| s.size()).sum()
    }
}

/// Parse a PLY body into a point cloud.
pub fn parse_ply(bytes: &[u8]) -> Result<PointCloud, PlyError> {
    let (header, body) = split_header(bytes)?;
    let (format, layout) = parse_header(header)?;

    let x = layout.index_of("x").ok_or(PlyError::MissingPosition)?;
    let y = layout.index_of("y").ok_or(PlyError::MissingPosition)?;
    let z = layout.index_of("z").ok_or(PlyError::MissingPosition)?;
    for idx in [x, y, z] {
        let (name, scalar) = &layout.props[idx];
        if !matches!(scalar, Scalar::F32 | Scalar::F64) {
            return Err(PlyError::UnsupportedProperty(format!(
                "{name} must be float"
            )));
        }
    }

    // Colors are carried only when the full uchar triple is present.
    let rgb = match (
        layout.index_of("red"),
        layout.index_of("green"),
        layout.index_of("blue"),
    ) {
        (Some(r), Some(g), Some(b))
            if [r, g, b]
                .iter()
                .all(|i| layout.props[*i].1 == Scalar::U8) =>
        {
            Some([r, g, b])
        }
        _ => None,
    };

    match format {
        Format::Ascii => parse_ascii_vertices(body, &layout, [x, y, z], rgb),
        Format::BinaryLittleEndian => parse_binary_vertices(body, &layout, [x, y, z], rgb),
    }
}

fn split_header(bytes: &[u8]) -> Result<(&str, &[u8]), PlyError> {
    // The header is ASCII lines up to and including "end_header".
    let mut offset = 0usize;
    while offset < bytes.len() {
        let line_end = bytes[offset..]
            .iter()
            .position(|b| *b == b'\n')
            .map(|p| offset + p)
            .ok_or(PlyError::Header("no end_header".to_string()))?;
        let line = &bytes[offset..line_end];
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line == b"end_header" {
            let header = std::str::from_utf8(&bytes[..offset])
                .map_err(|_| PlyError::Header("non-ASCII header".to_string()))?;
            return Ok((header, &bytes[line_end + 1..]));
        }
        offset = line_end + 1;
    }
    Err(PlyError::Header("no end_header".to_string()))
}

fn parse_header(header: &str) -> Result<(Format, VertexLayout), PlyError> {
    let mut lines = header.lines().map(str::trim).filter(|l| !l.is_empty());
    if lines.next() != Some("ply") {
        return Err(PlyError::NotPly);
    }

    let mut format = None;
    let mut layout: Option<VertexLayout> = None;
    let mut in_vertex_element = false;
    let mut seen_vertex_element = false;

    for line in lines {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("format") => {
                let name = tokens.next().unwrap_or("");
                format = Some(match name {
                    "ascii" => Format::Ascii,
                    "binary_little_endian" => Format::BinaryLittleEndian,
                    other => return Err(PlyError::UnsupportedFormat(other.to_string())),
                });
            }
            Some("comment") | Some("obj_info") => {}
            Some("element") => {
                let name = tokens.next().unwrap_or("");
                if name == "vertex" {
                    if seen_vertex_element {
                        return Err(PlyError::Header("duplicate vertex element".to_string()));
                    }
                    let count = tokens
                        .next()
                        .and_then(|c| c.parse::<usize>().ok())
                        .ok_or(PlyError::Header("bad vertex count".to_string()))?;
                    layout = Some(VertexLayout {
                        props: Vec::new(),
                        count,
                    });
                    in_vertex_element = true;
                    seen_vertex_element = true;
                } else {
                    if !seen_vertex_element {
                        // Skipping an unknown element's payload would need its
                        // full layout; reconstruction exports put vertices first.
                        return Err(PlyError::Header(format!(
                            "element {name} precedes vertex data"
                        )));
                    }
                    in_vertex_element = false;
                }
            }
            Some("property") => {
                if !in_vertex_element {
                    continue;
                }
                let Some(layout) = layout.as_mut() else {
                    continue;
                };
                let kind = tokens.next().unwrap_or("");
                if kind == "list" {
                    return Err(PlyError::UnsupportedProperty(
                        "list property in vertex element".to_string(),
                    ));
                }
                let scalar = Scalar::from_name(kind)
                    .ok_or_else(|| PlyError::UnsupportedProperty(kind.to_string()))?;
                let name = tokens
                    .next()
                    .ok_or(PlyError::Header("property without name".to_string()))?;
                layout.props.push((name.to_string(), scalar));
            }
            Some(other) => {
                return Err(PlyError::Header(format!("unknown keyword: {other}")));
            }
            None => {}
        }
    }

    let format = format.ok_or(PlyError::Header("missing format line".to_string()))?;
    let layout = layout.ok_or(PlyError::MissingVertexElement)?;
    Ok((format, layout))
}

fn parse_ascii_vertices(
    body: &[u8],
    layout: &VertexLayout,
    xyz: [usize; 3],
    rgb: Option<[usize; 3]>,
) -> Result<PointCloud, PlyError> {
    let text =
        std::str::from_utf8(body).map_err(|_| PlyError::BadAscii("non-UTF8 body".to_string()))?;
    let mut positions = Vec::with_capacity(layout.count);
    let mut colors = rgb.map(|_| Vec::with_capacity(layout.count));

    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    for _ in 0..layout.count {
        let line = lines.next().ok_or(PlyError::Truncated)?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < layout.props.len() {
            return Err(PlyError::BadAscii(format!(
                "expected {} values, got {}",
                layout.props.len(),
                tokens.len()
            )));
        }
        let number = |idx: usize| -> Result<f64, PlyError> {
            tokens[idx]
                .parse::<f64>()
                .map_err(|_| PlyError::BadAscii(format!("bad number: {}", tokens[idx])))
        };
        positions.push([
            number(xyz[0])? as f32,
            number(xyz[1])? as f32,
            number(xyz[2])? as f32,
        ]);
        if let (Some(colors), Some(rgb)) = (colors.as_mut(), rgb) {
            colors.push([
                number(rgb[0])? as u8,
                number(rgb[1])? as u8,
                number(rgb[2])? as u8,
            ]);
        }
    }

    Ok(PointCloud { positions, colors })
}

fn parse_binary_vertices(
    body: &[u8],
    layout: &VertexLayout,
    xyz: [usize; 3],
    rgb: Option<[usize; 3]>,
) -> Result<PointCloud, PlyError> {
    let stride = layout.stride();
    if body.len() < stride * layout.count {
        return Err(PlyError::Truncated);
    }

    let offsets = [
        layout.byte_offset(xyz[0]),
        layout.byte_offset(xyz[1]),
        layout.byte_offset(xyz[2]),
    ];
    let scalars = [
        layout.props[xyz[0]].1,
        layout.props[xyz[1]].1,
        layout.props[xyz[2]].1,
    ];

    let mut positions = Vec::with_capacity(layout.count);
    let mut colors = rgb.map(|_| Vec::with_capacity(layout.count));

    for i in 0..layout.count {
        let record = &body[i * stride..(i + 1) * stride];
        positions.push([
            scalars[0].read_le_f64(&record[offsets[0]..]) as f32,
            scalars[1].read_le_f64(&record[offsets[1]..]) as f32,
            scalars[2].read_le_f64(&record[offsets[2]..]) as f32,
        ]);
        if let (Some(colors), Some(rgb)) = (colors.as_mut(), rgb) {
            colors.push([
                record[layout.byte_offset(rgb[0])],
                record[layout.byte_offset(rgb[1])],
                record[layout.byte_offset(rgb[2])],
            ]);
        }
    }

    Ok(PointCloud { positions, colors })
}

#[cfg(test)]
mod tests {
    use super::{PlyError, parse_ply};

    const ASCII_WITH_COLORS: &str = "ply\n\
        format ascii 1.0\n\
        comment exported reconstruction\n\
        element vertex 3\n\
        property float x\n\
        property float y\n\
        property float z\n\
        property uchar red\n\
        property uchar green\n\
        property uchar blue\n\
        end_header\n\
        0 0 0 255 0 0\n\
        1 2 3 0 255 0\n\
        -1 -2 -3 0 0 255\n";

    #[test]
    fn parses_ascii_with_colors() {
        let cloud = parse_ply(ASCII_WITH_COLORS.as_bytes()).expect("parse");
        assert_eq!(cloud.len(), 3);
        assert_eq!(cloud.positions[1], [1.0, 2.0, 3.0]);
        let colors = cloud.colors.expect("colors");
        assert_eq!(colors[0], [255, 0, 0]);
        assert_eq!(colors[2], [0, 0, 255]);
    }

    #[test]
    fn parses_binary_little_endian() {
        let mut bytes = b"ply\n\
            format binary_little_endian 1.0\n\
            element vertex 2\n\
            property float x\n\
            property float y\n\
            property float z\n\
            property uchar red\n\
            property uchar green\n\
            property uchar blue\n\
            end_header\n"
            .to_vec();
        for (pos, color) in [
            ([1.0f32, 2.0, 3.0], [10u8, 20, 30]),
            ([-4.0, 5.0, -6.0], [40, 50, 60]),
        ] {
            for v in pos {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
            bytes.extend_from_slice(&color);
        }

        let cloud = parse_ply(&bytes).expect("parse");
        assert_eq!(cloud.positions, vec![[1.0, 2.0, 3.0], [-4.0, 5.0, -6.0]]);
        assert_eq!(cloud.colors, Some(vec![[10, 20, 30], [40, 50, 60]]));
    }

    #[test]
    fn binary_without_colors_and_extra_props() {
        let mut bytes = b"ply\n\
            format binary_little_endian 1.0\n\
            element vertex 1\n\
            property float x\n\
            property float y\n\
            property float z\n\
            property float confidence\n\
            end_header\n"
            .to_vec();
        for v in [7.0f32, 8.0, 9.0, 0.5] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let cloud = parse_ply(&bytes).expect("parse");
        assert_eq!(cloud.positions, vec![[7.0, 8.0, 9.0]]);
        assert_eq!(cloud.colors, None);
    }

    #[test]
    fn double_positions_are_accepted() {
        let mut bytes = b"ply\n\
            format binary_little_endian 1.0\n\
            element vertex 1\n\
            property double x\n\
            property double y\n\
            property double z\n\
            end_header\n"
            .to_vec();
        for v in [0.5f64, -1.5, 2.5] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let cloud = parse_ply(&bytes).expect("parse");
        assert_eq!(cloud.positions, vec![[0.5, -1.5, 2.5]]);
    }

    #[test]
    fn truncated_binary_body_errors() {
        let mut bytes = b"ply\n\
            format binary_little_endian 1.0\n\
            element vertex 2\n\
            property float x\n\
            property float y\n\
            property float z\n\
            end_header\n"
            .to_vec();
        bytes.extend_from_slice(&1.0f32.to_le_bytes());
        assert_eq!(parse_ply(&bytes), Err(PlyError::Truncated));
    }

    #[test]
    fn big_endian_is_unsupported() {
        let header = "ply\nformat binary_big_endian 1.0\nelement vertex 0\nend_header\n";
        assert_eq!(
            parse_ply(header.as_bytes()),
            Err(PlyError::UnsupportedFormat("binary_big_endian".to_string()))
        );
    }

    #[test]
    fn missing_magic_and_missing_vertex_error() {
        assert_eq!(
            parse_ply(b"obj\nend_header\n"),
            Err(PlyError::NotPly)
        );
        let no_vertex = "ply\nformat ascii 1.0\nend_header\n";
        assert_eq!(
            parse_ply(no_vertex.as_bytes()),
            Err(PlyError::MissingVertexElement)
        );
    }

    #[test]
    fn face_element_after_vertices_is_ignored() {
        let body = "ply\n\
            format ascii 1.0\n\
            element vertex 1\n\
            property float x\n\
            property float y\n\
            property float z\n\
            element face 1\n\
            property list uchar int vertex_indices\n\
            end_header\n\
            1 1 1\n\
            3 0 0 0\n";
        let cloud = parse_ply(body.as_bytes()).expect("parse");
        assert_eq!(cloud.len(), 1);
    }

    #[test]
    fn recenter_moves_bbox_center_to_origin() {
        let mut cloud = parse_ply(ASCII_WITH_COLORS.as_bytes()).expect("parse");
        let center = cloud.recenter();
        assert_eq!(center, [0.0, 0.0, 0.0]);

        let body = "ply\nformat ascii 1.0\nelement vertex 2\n\
            property float x\nproperty float y\nproperty float z\nend_header\n\
            2 4 6\n4 8 10\n";
        let mut cloud = parse_ply(body.as_bytes()).expect("parse");
        let center = cloud.recenter();
        assert_eq!(center, [3.0, 6.0, 8.0]);
        assert_eq!(cloud.bounding_box_center(), Some([0.0, 0.0, 0.0]));
        assert_eq!(cloud.positions[0], [-1.0, -2.0, -2.0]);
    }

    #[test]
    fn empty_cloud_recenter_is_a_noop() {
        let body = "ply\nformat ascii 1.0\nelement vertex 0\n\
            property float x\nproperty float y\nproperty float z\nend_header\n";
        let mut cloud = parse_ply(body.as_bytes()).expect("parse");
        assert!(cloud.is_empty());
        assert_eq!(cloud.recenter(), [0.0, 0.0, 0.0]);
    }
}
