use std::fmt;

/// Position in the folder hierarchy, stored without leading or trailing
/// separators. The root is the empty string.
///
/// Segment names must not contain `/`; names handed in by listings never
/// do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of the child `name` under this path.
    pub fn descend(&self, name: &str) -> Self {
        if self.is_root() {
            Self(name.to_string())
        } else {
            Self(format!("{}/{}", self.0, name))
        }
    }

    /// Parent path. Ascending from the root stays at the root, so
    /// `p.descend(name).ascend() == p` for any segment name.
    pub fn ascend(&self) -> Self {
        match self.0.rfind('/') {
            Some(idx) => Self(self.0[..idx].to_string()),
            None => Self::root(),
        }
    }

    /// Last segment, empty at the root.
    pub fn name(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Object-key prefix for listing directly under this path: empty at
    /// the root, `{path}/` everywhere else.
    pub fn as_list_prefix(&self) -> String {
        if self.is_root() {
            String::new()
        } else {
            format!("{}/", self.0)
        }
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
