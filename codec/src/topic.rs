// Use of this source is governed by an LGPL-3.0-or-later license that can be
// found in the LICENSE file.

//! Topic name/filter syntax validation.
//!
//! Matching a filter against a name is a server responsibility and explicitly
//! out of scope; what the client still owns is rejecting syntactically
//! invalid strings before they go on the wire, per MQTT-4.7.1-2/3/4.

use crate::error::EncodeError;

/// Validate a PUBLISH topic name: non-empty and free of the wildcard
/// characters, which are reserved for filters and must never appear in a
/// name a message is actually published to (MQTT-3.3.2-2).
///
/// # Errors
/// [`EncodeError::InvalidData`] if `topic` is empty or contains `+` or `#`.
pub fn validate_publish_topic(topic: &str) -> Result<(), EncodeError> {
    if topic.is_empty() {
        return Err(EncodeError::InvalidData("publish topic must not be empty"));
    }
    if topic.contains(['+', '#']) {
        return Err(EncodeError::InvalidData(
            "publish topic must not contain wildcard characters",
        ));
    }
    Ok(())
}

/// Validate a SUBSCRIBE/UNSUBSCRIBE topic filter: non-empty, and any `+`/`#`
/// wildcard must occupy a whole level (MQTT-4.7.1-2/3), with `#` only
/// permitted as the final level (MQTT-4.7.1-2).
///
/// # Errors
/// [`EncodeError::InvalidData`] if `filter` is empty or a wildcard character
/// shares a level with other characters, or `#` is not the last level.
pub fn validate_filter(filter: &str) -> Result<(), EncodeError> {
    if filter.is_empty() {
        return Err(EncodeError::InvalidData("topic filter must not be empty"));
    }
    let levels: Vec<&str> = filter.split('/').collect();
    let last = levels.len() - 1;
    for (i, level) in levels.iter().enumerate() {
        if level.contains('#') && (*level != "#" || i != last) {
            return Err(EncodeError::InvalidData(
                "'#' must occupy the whole final level of a topic filter",
            ));
        }
        if level.contains('+') && *level != "+" {
            return Err(EncodeError::InvalidData(
                "'+' must occupy a whole level of a topic filter",
            ));
        }
    }
    Ok(())
}
