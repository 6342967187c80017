/// Zero padding of the sequence number in generated names
pub const SEQUENCE_WIDTH: usize = 3;

/// Next number handed out to a renamed archive.
/// Owned by whoever drives the batch and only advanced once a file made it through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sequence(u32);

impl Sequence {
    #[must_use]
    pub fn new(start: u32) -> Self {
        Self(start)
    }

    #[must_use]
    pub fn current(self) -> u32 {
        self.0
    }

    pub fn advance(&mut self) {
        self.0 = self.0.saturating_add(1);
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingPolicy {
    /// `<prefix><sequence>.<extension>`, the original name is discarded
    Sequential { prefix: String },
    /// The original name without its parenthesized parts and extra spaces
    Clean,
}

impl NamingPolicy {
    #[must_use]
    pub fn file_name(&self, original: &str, sequence: Sequence) -> String {
        match self {
            Self::Sequential { prefix } => normalize(original, prefix, sequence.current()),
            Self::Clean => clean_file_name(original),
        }
    }
}

/// Builds `<prefix><sequence padded to 3 digits>.<extension of original>`
///
/// ```
/// use cbz_compress::naming::normalize;
///
/// assert_eq!(normalize("Some Title (v2).cbz", "MyBook", 5), "MyBook005.cbz");
/// ```
#[must_use]
pub fn normalize(original: &str, prefix: &str, sequence: u32) -> String {
    let cleaned = clean_file_name(original);

    match split_extension(&cleaned) {
        (_, Some(extension)) => format!("{prefix}{sequence:0>SEQUENCE_WIDTH$}.{extension}"),
        (_, None) => format!("{prefix}{sequence:0>SEQUENCE_WIDTH$}"),
    }
}

/// Drops every `(...)` group, collapses whitespace runs and trims the stem
#[must_use]
pub fn clean_file_name(original: &str) -> String {
    let mut without_groups = String::with_capacity(original.len());
    let mut rest = original;

    while let Some(open) = rest.find('(') {
        let Some(close) = rest[open..].find(')') else {
            break;
        };
        without_groups.push_str(&rest[..open]);
        rest = &rest[open + close + 1..];
    }
    without_groups.push_str(rest);

    let collapsed = without_groups
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    match split_extension(&collapsed) {
        (stem, Some(extension)) => format!("{}.{extension}", stem.trim_end()),
        (stem, None) => stem.to_string(),
    }
}

/// Splits on the last dot, leading dots don't start an extension (`.hidden` has none)
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(index) if !name[..index].chars().all(|c| c == '.') => {
            (&name[..index], Some(&name[index + 1..]))
        }
        _ => (name, None),
    }
}
