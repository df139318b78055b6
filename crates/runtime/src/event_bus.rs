/// Outbound notifications for the embedding application.
///
/// Payloads carry iso codes only; display data travels in the layer
/// snapshots so the embedder never has to hold feature references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEvent {
    /// Pointer entered (`Some`) or left (`None`) a country shape.
    CountryHover { isocode: Option<String> },
    /// A country shape was clicked.
    CountryClick { isocode: String },
}

#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<MapEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: MapEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[MapEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, MapEvent};

    #[test]
    fn records_events_in_order() {
        let mut bus = EventBus::new();
        bus.emit(MapEvent::CountryHover {
            isocode: Some("FR".to_string()),
        });
        bus.emit(MapEvent::CountryClick {
            isocode: "FR".to_string(),
        });
        assert_eq!(bus.events().len(), 2);
        assert_eq!(
            bus.events()[1],
            MapEvent::CountryClick {
                isocode: "FR".to_string()
            }
        );
    }

    #[test]
    fn drain_clears_events() {
        let mut bus = EventBus::new();
        bus.emit(MapEvent::CountryHover { isocode: None });
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(bus.events().is_empty());
    }
}
