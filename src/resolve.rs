use crate::{log::Error, region::Region, store::Store, value::Value};

/// Resolve a variable path against the given [`Store`].
///
/// The first segment is searched for in the store's scopes, innermost
/// first. Every following segment is looked up on the value produced so
/// far, trying each strategy in a fixed order:
///
/// 1. Key-based lookup, when the value is a map containing the segment as
///    a key.
/// 2. Named attribute lookup, when the value is an object reporting the
///    segment as an attribute.
/// 3. Position-based lookup, when the segment is a non-negative integer
///    and the value is a list with that index.
///
/// A path that cannot be walked to the end resolves to
/// [`Value::Invalid`], not an error; rendering substitutes the engine's
/// invalid text. The only errors this function produces are faults
/// surfaced by attribute evaluations that do not declare themselves
/// silent.
///
/// # Errors
///
/// Returns an [`Error`] wrapping the [`Fault`][`crate::Fault`] when an
/// attribute evaluation fails and the fault is not silent.
pub(crate) fn resolve_path(source: &str, path: &[Region], store: &Store) -> Result<Value, Error> {
    let mut segments = path.iter();
    let root = segments
        .next()
        .expect("variable path should always have at least one segment")
        .literal(source);

    let mut value = match store.get(root) {
        Some(found) => found.clone(),
        None => return Ok(Value::Invalid),
    };

    for region in segments {
        let segment = region.literal(source);

        // Key-based lookup.
        if let Value::Map(entries) = &value {
            if let Some(found) = entries.get(segment) {
                value = found.clone();
                continue;
            }
        }

        // Named attribute lookup. Presence is decided by `has_attribute`
        // alone, so a fault raised while evaluating an attribute that does
        // exist is never mistaken for the attribute being absent.
        if let Value::Object(object) = &value {
            if object.has_attribute(segment) {
                match object.attribute(segment) {
                    Ok(found) => {
                        value = found;
                        continue;
                    }
                    Err(fault) if fault.is_silent() => return Ok(Value::Invalid),
                    Err(fault) => {
                        return Err(Error::from_fault(fault).with_pointer(source, *region))
                    }
                }
            }
        }

        // Position-based lookup.
        if let Value::List(items) = &value {
            if let Ok(index) = segment.parse::<usize>() {
                if let Some(found) = items.get(index) {
                    value = found.clone();
                    continue;
                }
            }
        }

        return Ok(Value::Invalid);
    }

    Ok(value)
}
