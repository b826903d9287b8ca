//! Document-local `#id` references

/// Strip the leading `#` of a document-local reference.
///
/// Returns `None` for external URIs (`file.dae#id`, `http://...`) and empty
/// fragments, which this pipeline does not follow. A bare id without `#` is
/// accepted as-is since several exporters omit it on `source` attributes.
pub fn fragment(reference: &str) -> Option<&str> {
    let reference = reference.trim();
    let id = match reference.strip_prefix('#') {
        Some(id) => id,
        None if reference.contains('#') || reference.contains('/') => return None,
        None => reference,
    };
    if id.is_empty() { None } else { Some(id) }
}
