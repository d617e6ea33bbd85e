//! Raw IRC line tokenizing.
//!
//! Splits `[@tags] [:prefix] COMMAND [params] [:trailing]` into its parts.
//! Tags are recognised and dropped since nothing downstream needs them.

/// A tokenized IRC line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    /// Origin of the line (server name or `nick!user@host`).
    pub prefix: Option<&'a str>,
    /// Command or three-digit numeric.
    pub command: &'a str,
    /// Parameters, the trailing one included.
    pub params: Vec<&'a str>,
}

impl<'a> Line<'a> {
    /// Tokenize a single line, with or without its CR-LF terminator.
    ///
    /// Returns `None` for blank lines and lines with a prefix but no command.
    #[must_use]
    pub fn parse(input: &'a str) -> Option<Self> {
        let mut rest = input.trim_end_matches(['\r', '\n']);

        if rest.starts_with('@') {
            rest = rest.split_once(' ')?.1;
        }
        rest = rest.trim_start_matches(' ');

        let prefix = match rest.strip_prefix(':') {
            Some(stripped) => {
                let (prefix, tail) = stripped.split_once(' ')?;
                rest = tail.trim_start_matches(' ');
                Some(prefix)
            }
            None => None,
        };

        let (command, mut remaining) = match rest.split_once(' ') {
            Some((command, tail)) => (command, tail),
            None => (rest, ""),
        };
        if command.is_empty() {
            return None;
        }

        let mut params = Vec::new();
        loop {
            remaining = remaining.trim_start_matches(' ');
            if remaining.is_empty() {
                break;
            }
            if let Some(trailing) = remaining.strip_prefix(':') {
                params.push(trailing);
                break;
            }
            match remaining.split_once(' ') {
                Some((param, tail)) => {
                    params.push(param);
                    remaining = tail;
                }
                None => {
                    params.push(remaining);
                    break;
                }
            }
        }

        Some(Self {
            prefix,
            command,
            params,
        })
    }

    /// Get a parameter by index.
    #[must_use]
    pub fn param(&self, index: usize) -> Option<&'a str> {
        self.params.get(index).copied()
    }
}
