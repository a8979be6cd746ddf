//! Debug session model
//!
//! The host (an IDE debug extension) owns the session lifecycle and the
//! transport to the debug adapter. This module only describes what the
//! inspection code consumes from it: the selected frame and a DAP
//! request/response channel.

pub mod types;

#[cfg(test)]
pub(crate) mod fake;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::SessionError;
pub use types::{Scope, ScopeElement, StackFrame, Variable, VariableGroup};
use types::{EvaluateBody, ScopesBody, VariablesBody};

/// A live debug session
#[allow(async_fn_in_trait)]
pub trait DebugSession {
    /// Frame currently selected by the user, if the target is stopped
    fn current_frame(&self) -> Option<&StackFrame>;

    /// Send a DAP request and return the response body.
    ///
    /// Used for both standard commands and adapter-specific custom ones.
    async fn send_request(&self, command: &str, arguments: Value) -> Result<Value, SessionError>;

    /// Evaluate `expression` in `frame_id` and return the textual result
    async fn evaluate(
        &self,
        expression: &str,
        frame_id: i64,
        context: &str,
    ) -> Result<String, SessionError> {
        let body = self
            .send_request(
                "evaluate",
                json!({
                    "expression": expression,
                    "context": context,
                    "frameId": frame_id,
                }),
            )
            .await?;
        let body: EvaluateBody = decode_body("evaluate", body)?;
        Ok(body.result)
    }

    async fn scopes(&self, frame: &StackFrame) -> Result<Vec<Scope>, SessionError> {
        let body = self
            .send_request("scopes", json!({ "frameId": frame.id }))
            .await?;
        let body: ScopesBody = decode_body("scopes", body)?;
        Ok(body.scopes)
    }

    async fn variables(
        &self,
        variables_reference: i64,
        filter: Option<&str>,
    ) -> Result<Vec<Variable>, SessionError> {
        let mut arguments = json!({ "variablesReference": variables_reference });
        if let Some(filter) = filter {
            arguments["filter"] = json!(filter);
        }
        let body = self.send_request("variables", arguments).await?;
        let body: VariablesBody = decode_body("variables", body)?;
        Ok(body.variables)
    }

    /// Children of a scope.
    ///
    /// Scopes with more than `page_size` indexed children get their named
    /// children as variables followed by one group per page of indexed ones.
    async fn elements(
        &self,
        scope: &Scope,
        page_size: usize,
    ) -> Result<Vec<ScopeElement>, SessionError> {
        let page_size = page_size.max(1) as u64;
        let indexed = scope.indexed_variables.unwrap_or(0);

        if indexed <= page_size {
            let variables = self.variables(scope.variables_reference, None).await?;
            return Ok(variables.into_iter().map(ScopeElement::Variable).collect());
        }

        let mut elements: Vec<ScopeElement> = self
            .variables(scope.variables_reference, Some("named"))
            .await?
            .into_iter()
            .map(ScopeElement::Variable)
            .collect();

        let mut start = 0;
        while start < indexed {
            let count = (indexed - start).min(page_size);
            elements.push(ScopeElement::Group(VariableGroup {
                variables_reference: scope.variables_reference,
                start,
                count,
            }));
            start += count;
        }

        Ok(elements)
    }
}

/// Accessor for whichever session is currently active
pub trait SessionProvider {
    type Session: DebugSession;

    fn active_session(&self) -> Option<&Self::Session>;
}

impl<S: DebugSession> SessionProvider for Option<S> {
    type Session = S;

    fn active_session(&self) -> Option<&S> {
        self.as_ref()
    }
}

fn decode_body<T: DeserializeOwned>(command: &str, body: Value) -> Result<T, SessionError> {
    serde_json::from_value(body).map_err(|e| SessionError::invalid_body(command, e))
}

#[cfg(test)]
mod tests {
    use super::fake::FakeSession;
    use super::*;

    fn scope(indexed: Option<u64>) -> Scope {
        Scope {
            name: "Locals".to_string(),
            variables_reference: 1000,
            named_variables: None,
            indexed_variables: indexed,
            expensive: false,
        }
    }

    #[tokio::test]
    async fn test_evaluate_sends_watch_request() {
        let session = FakeSession::new(Some(StackFrame::new(7, "main")))
            .on("evaluate", |_| Ok(json!({ "result": "0x2000" })));

        let result = session.evaluate("&x", 7, "watch").await.unwrap();
        assert_eq!(result, "0x2000");

        let requests = session.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "evaluate");
        assert_eq!(
            requests[0].1,
            json!({ "expression": "&x", "context": "watch", "frameId": 7 })
        );
    }

    #[tokio::test]
    async fn test_evaluate_rejects_missing_result() {
        let session = FakeSession::new(None).on("evaluate", |_| Ok(json!({})));

        let err = session.evaluate("&x", 1, "watch").await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidBody { .. }));
    }

    #[tokio::test]
    async fn test_elements_small_scope() {
        let session = FakeSession::new(None).on("variables", |_| {
            Ok(json!({ "variables": [
                { "name": "a", "value": "1", "variablesReference": 0 },
                { "name": "b", "value": "2", "variablesReference": 0 },
            ]}))
        });

        let elements = session.elements(&scope(None), 100).await.unwrap();
        let names: Vec<_> = elements
            .iter()
            .filter_map(|element| match element {
                ScopeElement::Variable(v) => Some(v.name.as_str()),
                ScopeElement::Group(_) => None,
            })
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert!(session.requests()[0].1.get("filter").is_none());
    }

    #[tokio::test]
    async fn test_elements_pages_large_indexed_scope() {
        let session = FakeSession::new(None).on("variables", |_| {
            Ok(json!({ "variables": [{ "name": "len", "value": "250" }] }))
        });

        let elements = session.elements(&scope(Some(250)), 100).await.unwrap();
        assert_eq!(elements.len(), 4);
        assert!(matches!(elements[0], ScopeElement::Variable(_)));
        let groups: Vec<_> = elements
            .iter()
            .filter_map(|e| match e {
                ScopeElement::Group(g) => Some((g.start, g.count)),
                ScopeElement::Variable(_) => None,
            })
            .collect();
        assert_eq!(groups, [(0, 100), (100, 100), (200, 50)]);
        assert_eq!(session.requests()[0].1["filter"], "named");
    }

    #[test]
    fn test_option_is_a_provider() {
        let none: Option<FakeSession> = None;
        assert!(none.active_session().is_none());

        let some = Some(FakeSession::new(None));
        assert!(some.active_session().is_some());
    }
}
