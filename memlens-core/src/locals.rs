//! Address ranges of the local variables in the selected frame
//!
//! Every variable of every scope is asked for `&name` and `sizeof(name)`.
//! Variables whose answers are not a plain hex address and a plain decimal
//! size (optimized out, register-only, not addressable) are left out.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::codec::hex_to_u64;
use crate::error::InspectError;
use crate::session::{DebugSession, ScopeElement, SessionProvider, StackFrame, Variable};

static ADDRESS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]+$").expect("address pattern is valid"));

static SIZE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("size pattern is valid"));

/// `[address, past_the_end_address)` occupied by one variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRange {
    pub name: String,
    pub address: u64,
    pub past_the_end_address: u64,
}

/// Parse an address-of result such as `0x7ffd4c20`
pub fn parse_address(text: &str) -> Option<u64> {
    if !ADDRESS_PATTERN.is_match(text) {
        return None;
    }
    hex_to_u64(text).ok()
}

/// Parse a `sizeof` result such as `16`
pub fn parse_size(text: &str) -> Option<u64> {
    if !SIZE_PATTERN.is_match(text) {
        return None;
    }
    text.parse().ok()
}

/// Build the range from raw evaluate results, or `None` if it cannot be expressed
pub fn variable_range(name: &str, address_text: &str, size_text: &str) -> Option<VariableRange> {
    let address = parse_address(address_text)?;
    let size = parse_size(size_text)?;
    let past_the_end_address = address.checked_add(size)?;

    Some(VariableRange {
        name: name.to_string(),
        address,
        past_the_end_address,
    })
}

/// Enumerate the address ranges of all variables visible in the current frame.
///
/// Results follow scope order, then element order within each scope.
pub async fn get_locals<P: SessionProvider>(
    sessions: &P,
    evaluate_context: &str,
    page_size: usize,
) -> Result<Vec<VariableRange>, InspectError> {
    let session = sessions
        .active_session()
        .ok_or(InspectError::NoActiveSession)?;
    let frame = session
        .current_frame()
        .ok_or(InspectError::NoActiveFrame)?;

    let mut ranges = Vec::new();

    for scope in session.scopes(frame).await? {
        let elements = session.elements(&scope, page_size).await?;
        debug!(
            "Scope '{}' of frame {}: {} elements",
            scope.name,
            frame.id,
            elements.len()
        );

        for element in &elements {
            let variable = match element {
                ScopeElement::Variable(variable) => variable,
                ScopeElement::Group(group) => {
                    trace!("Skipping group {} in scope '{}'", group.label(), scope.name);
                    continue;
                }
            };

            if let Some(range) = resolve_range(session, frame, variable, evaluate_context).await? {
                ranges.push(range);
            }
        }
    }

    Ok(ranges)
}

/// Evaluate address then size, one after the other, against the same frame
async fn resolve_range<S: DebugSession>(
    session: &S,
    frame: &StackFrame,
    variable: &Variable,
    evaluate_context: &str,
) -> Result<Option<VariableRange>, InspectError> {
    let name = &variable.name;

    let address_text = session
        .evaluate(&format!("&{}", name), frame.id, evaluate_context)
        .await?;
    let size_text = session
        .evaluate(&format!("sizeof({})", name), frame.id, evaluate_context)
        .await?;

    let range = variable_range(name, &address_text, &size_text);
    if range.is_none() {
        trace!(
            "Skipping '{}': address={:?}, size={:?}",
            name,
            address_text,
            size_text
        );
    }

    Ok(range)
}
