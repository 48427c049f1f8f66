use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Separator placed between titles when a path is formatted
pub const PATH_SEPARATOR: &str = " → ";

/// Word separator used inside article identifiers
const WORD_SEPARATOR: char = '_';

/// Characters that would change the meaning of a URL if left raw in a title
const TITLE_ESCAPES: &AsciiSet = &CONTROLS.add(b'%').add(b'?').add(b'#').add(b'"');

/// Derives a display title from an article identifier
///
/// Percent-decodes (invalid UTF-8 is replaced, never rejected) and turns
/// underscores into spaces.
pub fn derive_title(article_id: &str) -> String {
    percent_decode_str(article_id)
        .decode_utf8_lossy()
        .replace(WORD_SEPARATOR, " ")
}

/// Turns a display title back into an article identifier
pub fn encode_title(title: &str) -> String {
    let joined = title.trim().replace(' ', "_");
    utf8_percent_encode(&joined, TITLE_ESCAPES).to_string()
}

/// Joins titles with [`PATH_SEPARATOR`]; no titles give the empty string
pub fn format_titles<I>(titles: I) -> String
where
    I: IntoIterator<Item = String>,
{
    titles.into_iter().collect::<Vec<_>>().join(PATH_SEPARATOR)
}
