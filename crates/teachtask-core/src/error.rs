use std::fmt;

/// Machine-readable error codes for scripting and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotAuthenticated,
    ConfigParseError,
    RecordNotFound,
    ItemNotFound,
    EmptyText,
    InvalidReorder,
    PriorityIsPositional,
    WriteConflict,
    RemoteFailure,
    ProviderTokenLimit,
    ProviderFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotAuthenticated => "E1001",
            Self::ConfigParseError => "E1002",
            Self::RecordNotFound => "E2001",
            Self::ItemNotFound => "E2002",
            Self::EmptyText => "E2003",
            Self::InvalidReorder => "E2004",
            Self::PriorityIsPositional => "E2005",
            Self::WriteConflict => "E3001",
            Self::RemoteFailure => "E5001",
            Self::ProviderTokenLimit => "E6001",
            Self::ProviderFailed => "E6002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotAuthenticated => "No authenticated user",
            Self::ConfigParseError => "Config file parse error",
            Self::RecordNotFound => "List record not found",
            Self::ItemNotFound => "Item not found",
            Self::EmptyText => "Item text is empty",
            Self::InvalidReorder => "Reorder sequence is not a permutation of the list",
            Self::PriorityIsPositional => "Todo priority follows list position",
            Self::WriteConflict => "List changed since it was read",
            Self::RemoteFailure => "Record store failure",
            Self::ProviderTokenLimit => "Model context length exceeded",
            Self::ProviderFailed => "Suggestion provider failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint surfaced next to the message.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotAuthenticated => Some("Set --user, TEACHTASK_USER, or [user] id in config."),
            Self::ConfigParseError => Some("Fix syntax in teachtask/config.toml and retry."),
            Self::RecordNotFound => Some("Open the list once so its record is provisioned."),
            Self::ItemNotFound => None,
            Self::EmptyText => Some("Provide non-blank text for the item."),
            Self::InvalidReorder => Some("Pass every item id of the list exactly once."),
            Self::PriorityIsPositional => Some("Use `tt reorder` to change a todo's priority."),
            Self::WriteConflict => Some("Reload the list and retry the change."),
            Self::RemoteFailure => Some("Check the database path and permissions."),
            Self::ProviderTokenLimit => Some("Shorten the lists or configure a larger model."),
            Self::ProviderFailed => Some("Check provider endpoints and API keys in config."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    const ALL: [ErrorCode; 12] = [
        ErrorCode::NotAuthenticated,
        ErrorCode::ConfigParseError,
        ErrorCode::RecordNotFound,
        ErrorCode::ItemNotFound,
        ErrorCode::EmptyText,
        ErrorCode::InvalidReorder,
        ErrorCode::PriorityIsPositional,
        ErrorCode::WriteConflict,
        ErrorCode::RemoteFailure,
        ErrorCode::ProviderTokenLimit,
        ErrorCode::ProviderFailed,
        ErrorCode::InternalUnexpected,
    ];

    #[test]
    fn all_codes_are_unique() {
        let mut seen = HashSet::new();
        for code in ALL {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        for code in ALL {
            let code = code.code();
            assert_eq!(code.len(), 5);
            assert!(code.starts_with('E'));
            assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
        }
    }
}
