use serde_json::{Map, Value};
use ts_timers::TimerId;

pub const LAST_TIMER_ID: &str = "lastTimerId";

/// Session-scoped scratch space. Seeded from the request envelope and echoed
/// back in the response, so it lives exactly as long as the session.
#[derive(Debug, Clone, Default)]
pub struct AttributesManager {
    session: Map<String, Value>,
}

impl AttributesManager {
    pub fn new(session: Map<String, Value>) -> Self {
        Self { session }
    }

    /// Id of the timer created most recently in this session.
    pub fn last_timer_id(&self) -> Option<TimerId> {
        self.session
            .get(LAST_TIMER_ID)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(TimerId::from)
    }

    pub fn set_last_timer_id(&mut self, id: &TimerId) {
        self.session
            .insert(LAST_TIMER_ID.to_string(), Value::String(id.to_string()));
    }

    pub fn into_session_attributes(self) -> Map<String, Value> {
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::{AttributesManager, LAST_TIMER_ID};
    use serde_json::{Map, Value, json};
    use ts_timers::TimerId;

    #[test]
    fn last_timer_id_round_trips_through_session_map() {
        let mut attributes = AttributesManager::default();
        assert!(attributes.last_timer_id().is_none());

        attributes.set_last_timer_id(&TimerId::new("t1"));
        assert_eq!(attributes.last_timer_id(), Some(TimerId::new("t1")));

        let map = attributes.into_session_attributes();
        assert_eq!(map[LAST_TIMER_ID], "t1");
    }

    #[test]
    fn non_string_or_empty_ids_are_ignored() {
        let mut map = Map::new();
        map.insert(LAST_TIMER_ID.to_string(), json!(42));
        assert!(AttributesManager::new(map).last_timer_id().is_none());

        let mut map = Map::new();
        map.insert(LAST_TIMER_ID.to_string(), Value::String(String::new()));
        assert!(AttributesManager::new(map).last_timer_id().is_none());
    }
}
