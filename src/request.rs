pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Literal argument that asks for the usage line.
pub const HELP_FLAG: &str = "--help";

/// What the positional arguments ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Usage,
    Relocate(String),
}

impl Request {
    /// Exactly one non-empty argument other than `--help` is a relocation
    /// request; anything else asks for usage.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        match args {
            [single] => {
                let target = single.as_ref();
                if target.is_empty() || target == HELP_FLAG {
                    Request::Usage
                } else {
                    Request::Relocate(target.to_string())
                }
            }
            _ => Request::Usage,
        }
    }
}

pub fn usage() -> String {
    format!("usage: {NAME} <new-version>\n{NAME} version {VERSION}")
}
