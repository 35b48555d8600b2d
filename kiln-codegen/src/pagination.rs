//! Paged-response shapes and accessor wiring.

use kiln_config::{OperationMapping, PaginationMode};

/// The supported pagination shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagedKind {
    Token,
    Number,
    NumberHasMore,
    LastId,
}

impl PagedKind {
    /// The kind for a mapping's pagination mode, if any.
    pub fn from_mode(mode: PaginationMode) -> Option<Self> {
        match mode {
            PaginationMode::None => None,
            PaginationMode::Token => Some(PagedKind::Token),
            PaginationMode::Number => Some(PagedKind::Number),
            PaginationMode::NumberHasMore => Some(PagedKind::NumberHasMore),
            PaginationMode::LastId => Some(PagedKind::LastId),
        }
    }

    /// Generic base class the paged model derives from.
    pub fn base_class(&self) -> &'static str {
        match self {
            PagedKind::Token => "TokenPagedResponse",
            PagedKind::Number | PagedKind::NumberHasMore => "NumberPagedResponse",
            PagedKind::LastId => "LastIDPagedResponse",
        }
    }

    /// The fields a synthesized paged model of this kind carries.
    pub fn roles(&self) -> &'static [PageRole] {
        match self {
            PagedKind::Token => &[PageRole::Items, PageRole::NextPageToken, PageRole::HasMore],
            PagedKind::Number => &[PageRole::Total, PageRole::Items],
            PagedKind::NumberHasMore => &[PageRole::HasMore, PageRole::Items],
            PagedKind::LastId => &[
                PageRole::FirstId,
                PageRole::LastId,
                PageRole::HasMore,
                PageRole::Items,
            ],
        }
    }

    /// The accessor surface of this kind: every accessor is emitted; one
    /// whose role has no backing field returns a fixed `None`.
    pub fn accessors(&self) -> &'static [(&'static str, PageRole)] {
        match self {
            PagedKind::Token => &[
                ("get_items", PageRole::Items),
                ("get_has_more", PageRole::HasMore),
                ("get_next_page_token", PageRole::NextPageToken),
            ],
            PagedKind::Number | PagedKind::NumberHasMore => &[
                ("get_total", PageRole::Total),
                ("get_has_more", PageRole::HasMore),
                ("get_items", PageRole::Items),
            ],
            PagedKind::LastId => &[
                ("get_first_id", PageRole::FirstId),
                ("get_last_id", PageRole::LastId),
                ("get_has_more", PageRole::HasMore),
                ("get_items", PageRole::Items),
            ],
        }
    }
}

/// The role a field plays in a paged response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRole {
    Items,
    HasMore,
    NextPageToken,
    Total,
    FirstId,
    LastId,
}

impl PageRole {
    /// The `page_fields` override key for this role.
    pub fn key(&self) -> &'static str {
        match self {
            PageRole::Items => "items",
            PageRole::HasMore => "has_more",
            PageRole::NextPageToken => "next_page_token",
            PageRole::Total => "total",
            PageRole::FirstId => "first_id",
            PageRole::LastId => "last_id",
        }
    }

    /// Field name used when the mapping configures nothing.
    pub fn default_field(&self) -> &'static str {
        self.key()
    }

    /// The configured (or default) field name for this role.
    pub fn field_name(&self, mapping: Option<&OperationMapping>) -> String {
        match mapping {
            Some(m) => m.page_field(self.key(), self.default_field()),
            None => self.default_field().to_string(),
        }
    }
}

/// Find the field backing a role among a model's field names: an exact
/// match wins, else a field whose name extends the role's name
/// (`total_count` backs `total`).
pub fn pick_field<'a>(names: &'a [String], wanted: &str) -> Option<&'a str> {
    names
        .iter()
        .find(|n| n.as_str() == wanted)
        .or_else(|| names.iter().find(|n| n.starts_with(wanted)))
        .map(String::as_str)
}

/// Parse a paged base-class header like `NumberPagedResponse[WorkspaceMember]`
/// into its kind and item type.
pub fn parse_paged_base(base: &str) -> Option<(PagedKind, String)> {
    let (class, rest) = match base.split_once('[') {
        Some((class, rest)) => (class, rest.strip_suffix(']')?),
        None => (base, "Any"),
    };
    let kind = match class {
        "TokenPagedResponse" => PagedKind::Token,
        "NumberPagedResponse" => PagedKind::Number,
        "LastIDPagedResponse" => PagedKind::LastId,
        _ => return None,
    };
    Some((kind, rest.to_string()))
}
