use std::sync::Arc;

use crate::error::RelayError;
use crate::source::{Source, SourceRef};

use super::{config::RelayConfig, relay::Relay};

/// Builder for constructing a [`Relay`].
pub struct RelayBuilder {
    cfg: RelayConfig,
    source: Option<SourceRef>,
}

impl RelayBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: RelayConfig) -> Self {
        Self { cfg, source: None }
    }

    /// Sets the event source.
    pub fn with_source<S: Source>(mut self, source: S) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Sets an already shared event source.
    pub fn with_source_ref(mut self, source: SourceRef) -> Self {
        self.source = Some(source);
        self
    }

    /// Validates the configuration and returns the relay in the `Created` state.
    ///
    /// Fails with [`RelayError::InvalidConfig`] if the store layout is invalid
    /// or no source was given.
    pub fn build(self) -> Result<Arc<Relay>, RelayError> {
        self.cfg.store.validate()?;
        let source = self
            .source
            .ok_or_else(|| RelayError::invalid("no event source configured"))?;
        Ok(Arc::new(Relay::new_internal(self.cfg, source)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventClass;
    use crate::source::ChannelSource;
    use crate::store::{BinSpec, StoreConfig};

    #[test]
    fn test_build_requires_source() {
        let err = RelayBuilder::new(RelayConfig::default()).build().err();
        assert!(matches!(err, Some(RelayError::InvalidConfig { .. })));
    }

    #[test]
    fn test_build_rejects_invalid_store() {
        let (_tx, source) = ChannelSource::channel(1);
        let mut cfg = RelayConfig::default();
        cfg.store = StoreConfig::new([BinSpec::new(EventClass::ANY, 1)]);

        let err = RelayBuilder::new(cfg).with_source_ref(source).build().err();
        assert_eq!(err.map(|e| e.as_label()), Some("relay_invalid_config"));
    }

    #[test]
    fn test_build_keeps_custom_capacities() {
        let (_tx, source) = ChannelSource::channel(1);
        let mut cfg = RelayConfig::default();
        cfg.store = StoreConfig::new([BinSpec::new(EventClass::ANSWER_RECEIVED, 5)]);

        let relay = RelayBuilder::new(cfg).with_source_ref(source).build().unwrap();
        assert_eq!(
            relay.config().store.capacity_of(EventClass::ANSWER_RECEIVED),
            Some(5)
        );
    }
}
