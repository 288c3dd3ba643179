//! Sync engine: the poll cycle and the command cycle.
//!
//! The poll cycle fetches every registered receiver's state and publishes the
//! value of each bound item. A receiver that cannot be reached is reported and
//! skipped; it never affects the others.
//!
//! The command cycle resolves an item to its binding and device, then
//! translates the payload into proxy writes. Volume commands re-poll the
//! receiver afterwards because one write changes both the dB and the percent
//! representation.
//!
//! Every proxy call is bounded by the request timeout, and every cycle holds
//! the device's lock for its whole duration. Poll cycles never overlap, whether
//! started by the poller or on demand.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use avsync_domain::attribute::AttributeKind;
use avsync_domain::binding::ItemBinding;
use avsync_domain::command::{CommandPayload, unquote};
use avsync_domain::error::{CommunicationError, ConfigurationError, SyncError};
use avsync_domain::id::{DeviceId, ItemId};
use avsync_domain::state::DeviceState;
use avsync_domain::update::StateUpdate;
use avsync_domain::volume;

use crate::ports::{BindingStore, DeviceProxy, EventSink};
use crate::registry::DeviceRegistry;

/// Upper bound for a single proxy exchange unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A device that could not be polled.
#[derive(Debug)]
pub struct PollFailure {
    pub device_id: DeviceId,
    pub error: CommunicationError,
}

/// Result of one poll cycle.
#[derive(Debug, Default)]
pub struct PollReport {
    /// Devices whose state was fetched and published.
    pub succeeded: Vec<DeviceId>,
    /// Devices that failed, one entry each.
    pub failed: Vec<PollFailure>,
}

/// What a command cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The receiver was written to.
    Applied,
    /// The payload shape does not apply to the bound attribute.
    Ignored,
}

/// Routes state from receivers to the event sink and commands back.
pub struct SyncEngine<P, B, S> {
    registry: Arc<DeviceRegistry<P>>,
    bindings: B,
    sink: S,
    request_timeout: Duration,
    cycle: Mutex<()>,
}

impl<P, B, S> SyncEngine<P, B, S>
where
    P: DeviceProxy,
    B: BindingStore,
    S: EventSink,
{
    /// Create an engine over `registry`, resolving items through `bindings`
    /// and publishing to `sink`.
    pub fn new(registry: Arc<DeviceRegistry<P>>, bindings: B, sink: S) -> Self {
        Self {
            registry,
            bindings,
            sink,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cycle: Mutex::new(()),
        }
    }

    /// Override the per-exchange timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &DeviceRegistry<P> {
        &self.registry
    }

    #[must_use]
    pub fn bindings(&self) -> &B {
        &self.bindings
    }

    /// Poll every registered device once, in identifier order.
    ///
    /// Waits for any cycle already in progress to finish first.
    #[tracing::instrument(skip_all)]
    pub async fn poll_cycle(&self) -> PollReport {
        let _cycle = self.cycle.lock().await;
        let mut report = PollReport::default();

        for handle in self.registry.snapshot() {
            let proxy = handle.lock().await;
            match self.request(proxy.get_state()).await {
                Ok(state) => {
                    let published = self.publish_state(handle.id(), &state, |_| true).await;
                    tracing::debug!(device = %handle.id(), published, "device polled");
                    report.succeeded.push(handle.id().clone());
                }
                Err(error) => {
                    tracing::warn!(
                        device = %handle.id(),
                        address = proxy.address(),
                        %error,
                        "cannot communicate with receiver"
                    );
                    report.failed.push(PollFailure {
                        device_id: handle.id().clone(),
                        error,
                    });
                }
            }
        }

        report
    }

    /// Poll a single device and publish all of its bound items.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownDevice`] when `device_id` is not
    /// registered, or a [`CommunicationError`] when the receiver fails.
    #[tracing::instrument(skip_all, fields(device = %device_id))]
    pub async fn poll_device(&self, device_id: &DeviceId) -> Result<(), SyncError> {
        let handle = self
            .registry
            .lookup(device_id)
            .ok_or_else(|| ConfigurationError::UnknownDevice(device_id.clone()))?;

        let proxy = handle.lock().await;
        let state = self.request(proxy.get_state()).await.inspect_err(|error| {
            tracing::warn!(address = proxy.address(), %error, "cannot communicate with receiver");
        })?;
        self.publish_state(device_id, &state, |_| true).await;
        Ok(())
    }

    /// Apply an inbound command to the item's bound device attribute.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownItem`] or
    /// [`ConfigurationError::UnknownDevice`] when the item cannot be routed,
    /// [`ConfigurationError::InvalidPayload`] when a literal volume is not a
    /// number, and a [`CommunicationError`] when the receiver fails. Nothing is
    /// published on error.
    #[tracing::instrument(skip_all, fields(item = %item_id))]
    pub async fn handle_command(
        &self,
        item_id: &ItemId,
        payload: CommandPayload,
    ) -> Result<CommandOutcome, SyncError> {
        let binding = self.bindings.resolve_item(item_id).ok_or_else(|| {
            tracing::error!("received command for unknown item");
            ConfigurationError::UnknownItem(item_id.clone())
        })?;
        let handle = self.registry.lookup(&binding.device_id).ok_or_else(|| {
            tracing::error!(device = %binding.device_id, "received command for unknown device");
            ConfigurationError::UnknownDevice(binding.device_id.clone())
        })?;

        tracing::debug!(
            device = %binding.device_id,
            kind = %binding.kind,
            %payload,
            "processing command"
        );

        let proxy = handle.lock().await;
        let result = self.dispatch(&binding, &*proxy, payload).await;
        if let Err(SyncError::Communication(error)) = &result {
            tracing::warn!(
                device = %binding.device_id,
                address = proxy.address(),
                %error,
                "cannot communicate with receiver"
            );
        }
        result
    }

    async fn dispatch(
        &self,
        binding: &ItemBinding,
        proxy: &P,
        payload: CommandPayload,
    ) -> Result<CommandOutcome, SyncError> {
        match (binding.kind, payload) {
            (AttributeKind::Power, CommandPayload::Boolean(on)) => {
                self.request(proxy.set_power(on)).await?;
            }
            (AttributeKind::Mute, CommandPayload::Boolean(mute)) => {
                self.request(proxy.set_mute(mute)).await?;
            }
            // Any payload names an input by its text form.
            (AttributeKind::Input, payload) => {
                let name = payload.to_string();
                self.request(proxy.set_input(unquote(&name))).await?;
            }
            (AttributeKind::SurroundProgram, payload) => {
                let name = payload.to_string();
                self.request(proxy.set_surround_program(unquote(&name)))
                    .await?;
            }
            (AttributeKind::VolumePercent | AttributeKind::VolumeDb, payload) => {
                return self.command_volume(binding, proxy, payload).await;
            }
            (kind, payload) => {
                tracing::debug!(%kind, %payload, "ignoring inapplicable command");
                return Ok(CommandOutcome::Ignored);
            }
        }
        Ok(CommandOutcome::Applied)
    }

    async fn command_volume(
        &self,
        binding: &ItemBinding,
        proxy: &P,
        payload: CommandPayload,
    ) -> Result<CommandOutcome, SyncError> {
        let target_db = match payload {
            CommandPayload::RelativeStep(direction) => {
                // Always re-read: the volume may have been changed at the receiver.
                let current = self.request(proxy.get_state()).await?;
                volume::clamp_db(current.volume_db() + direction.delta_db())
            }
            CommandPayload::Percent(percent) => {
                f64::from(volume::percent_to_db(i32::from(percent)))
            }
            CommandPayload::Literal(text) => {
                parse_db(&text).ok_or_else(|| ConfigurationError::InvalidPayload {
                    item: binding.item_id.clone(),
                    payload: text.clone(),
                })?
            }
            CommandPayload::Boolean(on) => {
                tracing::debug!(kind = %binding.kind, on, "ignoring inapplicable command");
                return Ok(CommandOutcome::Ignored);
            }
        };

        self.request(proxy.set_volume_db(target_db)).await?;

        let state = self.request(proxy.get_state()).await?;
        self.publish_state(&binding.device_id, &state, AttributeKind::is_volume)
            .await;
        Ok(CommandOutcome::Applied)
    }

    /// Publish `state` to every binding of `device_id` whose kind passes `include`.
    async fn publish_state(
        &self,
        device_id: &DeviceId,
        state: &DeviceState,
        include: impl Fn(AttributeKind) -> bool,
    ) -> usize {
        let mut published = 0;
        for binding in self.bindings.bindings_for_device(device_id) {
            if !include(binding.kind) {
                continue;
            }
            let Some(value) = state.value_for(binding.kind) else {
                continue;
            };
            tracing::trace!(item = %binding.item_id, kind = %binding.kind, %value, "publishing update");
            self.sink
                .publish(StateUpdate::new(binding.item_id, binding.kind, value))
                .await;
            published += 1;
        }
        published
    }

    async fn request<T>(
        &self,
        exchange: impl Future<Output = Result<T, CommunicationError>>,
    ) -> Result<T, CommunicationError> {
        tokio::time::timeout(self.request_timeout, exchange)
            .await
            .map_err(|_| CommunicationError::Timeout(self.request_timeout))?
    }
}

/// Parse a literal decibel value, clamped into range. Non-finite values are rejected.
fn parse_db(text: &str) -> Option<f64> {
    let db: f64 = unquote(text).parse().ok()?;
    if db.is_finite() {
        Some(volume::clamp_db(db))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding_store::InMemoryBindingStore;
    use avsync_domain::command::StepDirection;
    use avsync_domain::update::UpdateValue;
    use std::sync::Mutex;

    // ── Fake receiver ──────────────────────────────────────────────

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        GetState,
        Power(bool),
        Mute(bool),
        VolumeDb(f64),
        Input(String),
        Surround(String),
    }

    type CallLog = Arc<Mutex<Vec<Call>>>;

    struct FakeReceiver {
        state: Mutex<DeviceState>,
        calls: CallLog,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl FakeReceiver {
        fn new(state: DeviceState) -> (Self, CallLog) {
            let calls = CallLog::default();
            let receiver = Self {
                state: Mutex::new(state),
                calls: Arc::clone(&calls),
                fail_reads: false,
                fail_writes: false,
            };
            (receiver, calls)
        }

        fn unreachable() -> (Self, CallLog) {
            let (mut receiver, calls) = Self::new(living_room());
            receiver.fail_reads = true;
            receiver.fail_writes = true;
            (receiver, calls)
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn write(&self, call: Call, apply: impl FnOnce(&mut DeviceState)) -> Result<(), CommunicationError> {
            self.record(call);
            if self.fail_writes {
                return Err(refused());
            }
            apply(&mut *self.state.lock().unwrap());
            Ok(())
        }
    }

    fn refused() -> CommunicationError {
        CommunicationError::Transport(Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        )))
    }

    impl DeviceProxy for FakeReceiver {
        fn address(&self) -> &str {
            "fake"
        }

        async fn get_state(&self) -> Result<DeviceState, CommunicationError> {
            self.record(Call::GetState);
            if self.fail_reads {
                return Err(refused());
            }
            Ok(self.state.lock().unwrap().clone())
        }

        async fn set_power(&self, on: bool) -> Result<(), CommunicationError> {
            self.write(Call::Power(on), |s| s.power = on)
        }

        async fn set_mute(&self, mute: bool) -> Result<(), CommunicationError> {
            self.write(Call::Mute(mute), |s| s.mute = mute)
        }

        async fn set_volume_db(&self, db: f64) -> Result<(), CommunicationError> {
            self.write(Call::VolumeDb(db), |s| {
                *s = DeviceState::new(s.power, s.input.clone(), s.surround_program.clone(), db, s.mute);
            })
        }

        async fn set_input(&self, name: &str) -> Result<(), CommunicationError> {
            self.write(Call::Input(name.to_string()), |s| {
                s.input = Some(name.to_string());
            })
        }

        async fn set_surround_program(&self, name: &str) -> Result<(), CommunicationError> {
            self.write(Call::Surround(name.to_string()), |s| {
                s.surround_program = Some(name.to_string());
            })
        }
    }

    // ── Recording sink ─────────────────────────────────────────────

    #[derive(Default)]
    struct RecordingSink {
        updates: Mutex<Vec<StateUpdate>>,
    }

    impl RecordingSink {
        fn take(&self) -> Vec<StateUpdate> {
            std::mem::take(&mut *self.updates.lock().unwrap())
        }
    }

    impl EventSink for RecordingSink {
        fn publish(&self, update: StateUpdate) -> impl Future<Output = ()> + Send {
            self.updates.lock().unwrap().push(update);
            async {}
        }
    }

    // ── Helpers ────────────────────────────────────────────────────

    type TestEngine = SyncEngine<FakeReceiver, InMemoryBindingStore, Arc<RecordingSink>>;

    fn living_room() -> DeviceState {
        DeviceState::new(
            true,
            Some("HDMI1".into()),
            Some("Straight".into()),
            -40.0,
            false,
        )
    }

    fn bind(item: &str, device: &str, kind: AttributeKind) -> ItemBinding {
        ItemBinding::new(item.into(), device.into(), kind)
    }

    fn all_kinds(device: &str) -> Vec<ItemBinding> {
        AttributeKind::ALL
            .into_iter()
            .map(|kind| bind(&format!("{device}_{kind}"), device, kind))
            .collect()
    }

    fn engine(
        devices: Vec<(&str, FakeReceiver)>,
        bindings: Vec<ItemBinding>,
    ) -> (TestEngine, Arc<RecordingSink>) {
        let registry = Arc::new(DeviceRegistry::new());
        for (id, receiver) in devices {
            registry.register(DeviceId::new(id), receiver);
        }
        let sink = Arc::new(RecordingSink::default());
        let engine = SyncEngine::new(
            registry,
            InMemoryBindingStore::new(bindings),
            Arc::clone(&sink),
        );
        (engine, sink)
    }

    fn single_device(bindings: Vec<ItemBinding>) -> (TestEngine, Arc<RecordingSink>, CallLog) {
        let (receiver, calls) = FakeReceiver::new(living_room());
        let (engine, sink) = engine(vec![("default", receiver)], bindings);
        (engine, sink, calls)
    }

    fn value_of(updates: &[StateUpdate], item: &str) -> Option<UpdateValue> {
        updates
            .iter()
            .find(|u| u.item_id.as_str() == item)
            .map(|u| u.value.clone())
    }

    // ── Poll cycle ─────────────────────────────────────────────────

    #[tokio::test]
    async fn should_publish_every_bound_attribute_when_polled() {
        let (engine, sink, _) = single_device(all_kinds("default"));

        let report = engine.poll_cycle().await;

        assert_eq!(report.succeeded, [DeviceId::default()]);
        let updates = sink.take();
        assert_eq!(updates.len(), 6);
        assert_eq!(value_of(&updates, "default_power"), Some(UpdateValue::OnOff(true)));
        assert_eq!(value_of(&updates, "default_mute"), Some(UpdateValue::OnOff(false)));
        assert_eq!(
            value_of(&updates, "default_input"),
            Some(UpdateValue::Text("\"HDMI1\"".into()))
        );
        assert_eq!(
            value_of(&updates, "default_surroundProgram"),
            Some(UpdateValue::Text("\"Straight\"".into()))
        );
        assert_eq!(
            value_of(&updates, "default_volumeDb"),
            Some(UpdateValue::Decimal(-40.0))
        );
        assert_eq!(
            value_of(&updates, "default_volumePercent"),
            Some(UpdateValue::Percent(42))
        );
    }

    #[tokio::test]
    async fn should_not_publish_absent_fields() {
        let (receiver, _) = FakeReceiver::new(DeviceState::new(false, None, None, -80.0, true));
        let (engine, sink) = engine(vec![("default", receiver)], all_kinds("default"));

        engine.poll_cycle().await;

        let updates = sink.take();
        assert_eq!(updates.len(), 4);
        assert!(value_of(&updates, "default_input").is_none());
        assert!(value_of(&updates, "default_surroundProgram").is_none());
    }

    #[tokio::test]
    async fn should_isolate_failing_device_during_poll() {
        let (a, _) = FakeReceiver::new(living_room());
        let (b, b_calls) = FakeReceiver::unreachable();
        let (c, _) = FakeReceiver::new(living_room());
        let bindings = [all_kinds("a"), all_kinds("b"), all_kinds("c")].concat();
        let (engine, sink) = engine(vec![("a", a), ("b", b), ("c", c)], bindings);

        let report = engine.poll_cycle().await;

        assert_eq!(report.succeeded, [DeviceId::new("a"), DeviceId::new("c")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].device_id.as_str(), "b");
        assert_eq!(*b_calls.lock().unwrap(), [Call::GetState]);

        let updates = sink.take();
        assert_eq!(updates.len(), 12);
        assert!(updates.iter().all(|u| !u.item_id.as_str().starts_with("b_")));
        assert!(updates.iter().any(|u| u.item_id.as_str().starts_with("a_")));
        assert!(updates.iter().any(|u| u.item_id.as_str().starts_with("c_")));
    }

    #[tokio::test]
    async fn should_poll_device_without_bindings_silently() {
        let (engine, sink, calls) = single_device(vec![]);

        let report = engine.poll_cycle().await;

        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(*calls.lock().unwrap(), [Call::GetState]);
        assert!(sink.take().is_empty());
    }

    #[tokio::test]
    async fn should_poll_single_device_on_demand() {
        let (engine, sink, _) = single_device(all_kinds("default"));

        engine.poll_device(&DeviceId::default()).await.unwrap();

        assert_eq!(sink.take().len(), 6);
    }

    #[tokio::test]
    async fn should_reject_poll_of_unknown_device() {
        let (engine, _, _) = single_device(vec![]);

        let result = engine.poll_device(&"patio".into()).await;

        assert!(matches!(
            result,
            Err(SyncError::Configuration(ConfigurationError::UnknownDevice(_)))
        ));
    }

    // ── Command routing ────────────────────────────────────────────

    #[tokio::test]
    async fn should_reject_command_for_unknown_item_without_proxy_calls() {
        let (engine, sink, calls) = single_device(all_kinds("default"));

        let result = engine
            .handle_command(&"Ghost".into(), CommandPayload::Boolean(true))
            .await;

        assert!(matches!(
            result,
            Err(SyncError::Configuration(ConfigurationError::UnknownItem(_)))
        ));
        assert!(calls.lock().unwrap().is_empty());
        assert!(sink.take().is_empty());
    }

    #[tokio::test]
    async fn should_reject_command_for_unregistered_device() {
        let (engine, _, calls) = single_device(vec![bind("Patio_Power", "patio", AttributeKind::Power)]);

        let result = engine
            .handle_command(&"Patio_Power".into(), CommandPayload::Boolean(true))
            .await;

        assert!(matches!(
            result,
            Err(SyncError::Configuration(ConfigurationError::UnknownDevice(id))) if id.as_str() == "patio"
        ));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_switch_power_on_boolean_command() {
        let (engine, sink, calls) = single_device(all_kinds("default"));

        let outcome = engine
            .handle_command(&"default_power".into(), CommandPayload::Boolean(false))
            .await
            .unwrap();

        assert_eq!(outcome, CommandOutcome::Applied);
        assert_eq!(*calls.lock().unwrap(), [Call::Power(false)]);
        assert!(sink.take().is_empty());
    }

    #[tokio::test]
    async fn should_ignore_non_boolean_power_command() {
        let (engine, _, calls) = single_device(all_kinds("default"));

        let outcome = engine
            .handle_command(&"default_power".into(), CommandPayload::Percent(40))
            .await
            .unwrap();

        assert_eq!(outcome, CommandOutcome::Ignored);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_mute_on_boolean_command() {
        let (engine, _, calls) = single_device(all_kinds("default"));

        engine
            .handle_command(&"default_mute".into(), CommandPayload::Boolean(true))
            .await
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), [Call::Mute(true)]);
    }

    #[tokio::test]
    async fn should_ignore_step_command_for_mute() {
        let (engine, _, calls) = single_device(all_kinds("default"));

        let outcome = engine
            .handle_command(
                &"default_mute".into(),
                CommandPayload::RelativeStep(StepDirection::Increase),
            )
            .await
            .unwrap();

        assert_eq!(outcome, CommandOutcome::Ignored);
        assert!(calls.lock().unwrap().is_empty());
    }

    // ── Volume ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_step_volume_from_fresh_state_and_republish() {
        let (engine, sink, calls) = single_device(all_kinds("default"));

        engine
            .handle_command(
                &"default_volumeDb".into(),
                CommandPayload::RelativeStep(StepDirection::Increase),
            )
            .await
            .unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            [Call::GetState, Call::VolumeDb(-39.5), Call::GetState]
        );
        let updates = sink.take();
        assert_eq!(updates.len(), 2);
        assert_eq!(
            value_of(&updates, "default_volumeDb"),
            Some(UpdateValue::Decimal(-39.5))
        );
        assert_eq!(
            value_of(&updates, "default_volumePercent"),
            Some(UpdateValue::Percent(42))
        );
    }

    #[tokio::test]
    async fn should_clamp_step_at_range_floor() {
        let (receiver, calls) = FakeReceiver::new(DeviceState::new(true, None, None, -80.0, false));
        let (engine, _) = engine(vec![("default", receiver)], all_kinds("default"));

        engine
            .handle_command(
                &"default_volumePercent".into(),
                CommandPayload::RelativeStep(StepDirection::Decrease),
            )
            .await
            .unwrap();

        assert_eq!(calls.lock().unwrap()[1], Call::VolumeDb(-80.0));
    }

    #[tokio::test]
    async fn should_convert_percent_command_and_publish_both_volumes() {
        let (engine, sink, calls) = single_device(all_kinds("default"));

        engine
            .handle_command(&"default_volumePercent".into(), CommandPayload::Percent(50))
            .await
            .unwrap();

        let expected_db = f64::from(volume::percent_to_db(50));
        assert_eq!(
            *calls.lock().unwrap(),
            [Call::VolumeDb(expected_db), Call::GetState]
        );
        let updates = sink.take();
        assert_eq!(updates.len(), 2);
        assert!(updates.iter().all(|u| u.kind.is_volume()));
        assert_eq!(
            value_of(&updates, "default_volumeDb"),
            Some(UpdateValue::Decimal(-32.0))
        );
        assert_eq!(
            value_of(&updates, "default_volumePercent"),
            Some(UpdateValue::Percent(50))
        );
    }

    #[tokio::test]
    async fn should_set_literal_decibels() {
        let (engine, _, calls) = single_device(all_kinds("default"));

        engine
            .handle_command(
                &"default_volumeDb".into(),
                CommandPayload::Literal("-25.5".into()),
            )
            .await
            .unwrap();

        assert_eq!(calls.lock().unwrap()[0], Call::VolumeDb(-25.5));
    }

    #[tokio::test]
    async fn should_clamp_literal_decibels() {
        let (engine, _, calls) = single_device(all_kinds("default"));

        engine
            .handle_command(&"default_volumeDb".into(), CommandPayload::Literal("30".into()))
            .await
            .unwrap();

        assert_eq!(calls.lock().unwrap()[0], Call::VolumeDb(16.0));
    }

    #[tokio::test]
    async fn should_reject_non_numeric_literal_volume_without_proxy_calls() {
        let (engine, sink, calls) = single_device(all_kinds("default"));

        let result = engine
            .handle_command(&"default_volumeDb".into(), CommandPayload::Literal("loud".into()))
            .await;

        assert!(matches!(
            result,
            Err(SyncError::Configuration(ConfigurationError::InvalidPayload { .. }))
        ));
        assert!(calls.lock().unwrap().is_empty());
        assert!(sink.take().is_empty());
    }

    #[tokio::test]
    async fn should_reject_nan_literal_volume() {
        let (engine, _, calls) = single_device(all_kinds("default"));

        let result = engine
            .handle_command(&"default_volumeDb".into(), CommandPayload::Literal("NaN".into()))
            .await;

        assert!(result.is_err());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_ignore_boolean_volume_command() {
        let (engine, _, calls) = single_device(all_kinds("default"));

        let outcome = engine
            .handle_command(&"default_volumeDb".into(), CommandPayload::Boolean(true))
            .await
            .unwrap();

        assert_eq!(outcome, CommandOutcome::Ignored);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_not_publish_when_repoll_fails_after_volume_write() {
        let (mut receiver, calls) = FakeReceiver::new(living_room());
        receiver.fail_reads = true;
        let (engine, sink) = engine(vec![("default", receiver)], all_kinds("default"));

        let result = engine
            .handle_command(&"default_volumePercent".into(), CommandPayload::Percent(10))
            .await;

        assert!(matches!(result, Err(SyncError::Communication(_))));
        assert_eq!(calls.lock().unwrap().len(), 2);
        assert!(sink.take().is_empty());
    }

    // ── Text attributes ────────────────────────────────────────────

    #[tokio::test]
    async fn should_unquote_input_and_publish_it_quoted() {
        let (engine, sink, calls) = single_device(all_kinds("default"));

        engine
            .handle_command(&"default_input".into(), CommandPayload::Literal("\"AV4\"".into()))
            .await
            .unwrap();
        assert_eq!(*calls.lock().unwrap(), [Call::Input("AV4".into())]);
        assert!(sink.take().is_empty());

        engine.poll_cycle().await;
        assert_eq!(
            value_of(&sink.take(), "default_input"),
            Some(UpdateValue::Text("\"AV4\"".into()))
        );
    }

    #[tokio::test]
    async fn should_pass_unquoted_input_through_once() {
        let (engine, _, calls) = single_device(all_kinds("default"));

        engine
            .handle_command(&"default_input".into(), CommandPayload::Literal("HDMI1".into()))
            .await
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), [Call::Input("HDMI1".into())]);
    }

    #[tokio::test]
    async fn should_select_input_from_text_of_any_command_shape() {
        let (engine, _, calls) = single_device(all_kinds("default"));

        for payload in [
            CommandPayload::Boolean(true),
            CommandPayload::RelativeStep(StepDirection::Increase),
            CommandPayload::Percent(40),
        ] {
            let outcome = engine
                .handle_command(&"default_input".into(), payload)
                .await
                .unwrap();
            assert_eq!(outcome, CommandOutcome::Applied);
        }

        assert_eq!(
            *calls.lock().unwrap(),
            [
                Call::Input("ON".into()),
                Call::Input("INCREASE".into()),
                Call::Input("40%".into()),
            ]
        );
    }

    #[tokio::test]
    async fn should_set_surround_program() {
        let (engine, _, calls) = single_device(all_kinds("default"));

        engine
            .handle_command(
                &"default_surroundProgram".into(),
                CommandPayload::Literal("\"Sci-Fi\"".into()),
            )
            .await
            .unwrap();

        assert_eq!(*calls.lock().unwrap(), [Call::Surround("Sci-Fi".into())]);
    }

    // ── Failure handling ───────────────────────────────────────────

    #[tokio::test]
    async fn should_report_communication_error_and_publish_nothing() {
        let (receiver, _) = FakeReceiver::unreachable();
        let (engine, sink) = engine(vec![("default", receiver)], all_kinds("default"));

        let result = engine
            .handle_command(&"default_power".into(), CommandPayload::Boolean(true))
            .await;

        assert!(matches!(result, Err(SyncError::Communication(_))));
        assert!(sink.take().is_empty());
    }

    struct StallingReceiver;

    impl DeviceProxy for StallingReceiver {
        fn address(&self) -> &str {
            "stalled"
        }

        async fn get_state(&self) -> Result<DeviceState, CommunicationError> {
            std::future::pending().await
        }

        async fn set_power(&self, _on: bool) -> Result<(), CommunicationError> {
            std::future::pending().await
        }

        async fn set_mute(&self, _mute: bool) -> Result<(), CommunicationError> {
            std::future::pending().await
        }

        async fn set_volume_db(&self, _db: f64) -> Result<(), CommunicationError> {
            std::future::pending().await
        }

        async fn set_input(&self, _name: &str) -> Result<(), CommunicationError> {
            std::future::pending().await
        }

        async fn set_surround_program(&self, _name: &str) -> Result<(), CommunicationError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn should_time_out_stalled_exchange() {
        let registry = Arc::new(DeviceRegistry::new());
        registry.register(DeviceId::default(), StallingReceiver);
        let engine = SyncEngine::new(
            registry,
            InMemoryBindingStore::new(all_kinds("default")),
            Arc::new(RecordingSink::default()),
        )
        .with_request_timeout(Duration::from_secs(2));

        let report = engine.poll_cycle().await;
        assert!(matches!(
            report.failed[0].error,
            CommunicationError::Timeout(d) if d == Duration::from_secs(2)
        ));

        let result = engine
            .handle_command(&"default_power".into(), CommandPayload::Boolean(true))
            .await;
        assert!(matches!(
            result,
            Err(SyncError::Communication(CommunicationError::Timeout(_)))
        ));
    }

    #[tokio::test]
    async fn should_wait_for_device_lock_before_polling() {
        let (receiver, calls) = FakeReceiver::new(living_room());
        let (engine, _) = engine(vec![("default", receiver)], vec![]);
        let engine = Arc::new(engine);

        let handle = engine.registry().lookup(&DeviceId::default()).unwrap();
        let guard = handle.lock().await;

        let poller = Arc::clone(&engine);
        let task = tokio::spawn(async move { poller.poll_cycle().await });
        tokio::task::yield_now().await;
        assert!(calls.lock().unwrap().is_empty());

        drop(guard);
        let report = task.await.unwrap();
        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(*calls.lock().unwrap(), [Call::GetState]);
    }
}
