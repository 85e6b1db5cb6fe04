/// Frame identifier: the key tying a search result, a displayed image, and a
/// camera frustum together.
///
/// Servers send it as either a JSON string or an integer; both normalize to
/// the same string form here so registry lookups never miss on a
/// numeric/string mismatch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(String);

impl FrameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn from_integer(id: i64) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::FrameId;

    #[test]
    fn integer_and_string_forms_agree() {
        assert_eq!(FrameId::from_integer(12), FrameId::new("12"));
        assert_eq!(FrameId::from_integer(12).as_str(), "12");
    }

    #[test]
    fn display_is_the_raw_key() {
        assert_eq!(FrameId::new("frame_007").to_string(), "frame_007");
    }
}
