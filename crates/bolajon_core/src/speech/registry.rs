//! In-process speech provider registry with ordered fallback.

use crate::speech::feedback::{Feedback, FeedbackRequest, FeedbackService};
use crate::speech::provider::{
    AudioClip, AudioRef, SpeechError, SpeechResult, SpeechService, SpeechStage, Transcript,
};
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// Registration and dispatch errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechRegistryError {
    InvalidProviderId(String),
    DuplicateProviderId(String),
    ProviderNotFound(String),
    /// Fallback order lists the same provider twice.
    DuplicateInOrder(String),
    NoProviders,
    /// Empty audio or blank text; no provider is called.
    EmptyInput(SpeechStage),
    /// Every provider in the fallback order failed, in call order.
    AllProvidersFailed(Vec<SpeechError>),
}

impl Display for SpeechRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidProviderId(value) => write!(f, "provider id is invalid: {value}"),
            Self::DuplicateProviderId(value) => {
                write!(f, "provider id already registered: {value}")
            }
            Self::ProviderNotFound(value) => write!(f, "provider not found: {value}"),
            Self::DuplicateInOrder(value) => {
                write!(f, "provider listed twice in fallback order: {value}")
            }
            Self::NoProviders => write!(f, "no speech providers registered"),
            Self::EmptyInput(stage) => write!(f, "empty input for {}", stage.as_str()),
            Self::AllProvidersFailed(errors) => {
                write!(f, "all speech providers failed")?;
                for err in errors {
                    write!(f, "; {err}")?;
                }
                Ok(())
            }
        }
    }
}

impl Error for SpeechRegistryError {}

/// Runtime speech provider registry.
///
/// Speech and feedback providers are kept in separate chains with their
/// own fallback order.
#[derive(Default)]
pub struct SpeechRegistry {
    providers: BTreeMap<String, Arc<dyn SpeechService>>,
    fallback_order: Vec<String>,
    feedback_providers: BTreeMap<String, Arc<dyn FeedbackService>>,
    feedback_order: Vec<String>,
}

impl SpeechRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one provider and appends it to the fallback order.
    pub fn register(&mut self, provider: Arc<dyn SpeechService>) -> Result<(), SpeechRegistryError> {
        let provider_id = checked_provider_id(provider.provider_id(), &self.providers)?;
        self.fallback_order.push(provider_id.clone());
        self.providers.insert(provider_id, provider);
        Ok(())
    }

    /// Registers one feedback provider and appends it to the feedback order.
    pub fn register_feedback(
        &mut self,
        provider: Arc<dyn FeedbackService>,
    ) -> Result<(), SpeechRegistryError> {
        let provider_id = checked_provider_id(provider.provider_id(), &self.feedback_providers)?;
        self.feedback_order.push(provider_id.clone());
        self.feedback_providers.insert(provider_id, provider);
        Ok(())
    }

    /// Number of speech providers; feedback providers are not counted.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Returns provider ids in fallback order.
    pub fn fallback_order(&self) -> &[String] {
        &self.fallback_order
    }

    /// Returns feedback provider ids in fallback order.
    pub fn feedback_order(&self) -> &[String] {
        &self.feedback_order
    }

    pub fn has_feedback(&self) -> bool {
        !self.feedback_order.is_empty()
    }

    /// Replaces the fallback order.
    ///
    /// Every id must be registered and listed once. Registered providers
    /// left out of `order` are skipped by dispatch.
    pub fn set_fallback_order(&mut self, order: &[&str]) -> Result<(), SpeechRegistryError> {
        let mut next: Vec<String> = Vec::with_capacity(order.len());
        for id in order {
            let normalized = id.trim();
            if !self.providers.contains_key(normalized) {
                return Err(SpeechRegistryError::ProviderNotFound(normalized.to_string()));
            }
            if next.iter().any(|existing| existing == normalized) {
                return Err(SpeechRegistryError::DuplicateInOrder(normalized.to_string()));
            }
            next.push(normalized.to_string());
        }
        self.fallback_order = next;
        Ok(())
    }

    /// Transcribes with the first provider that succeeds.
    pub fn transcribe(&self, audio: &AudioClip) -> Result<Transcript, SpeechRegistryError> {
        if audio.bytes.is_empty() {
            return Err(SpeechRegistryError::EmptyInput(SpeechStage::Transcribe));
        }
        dispatch(
            &self.providers,
            &self.fallback_order,
            SpeechStage::Transcribe,
            |provider| provider.transcribe(audio),
        )
    }

    /// Synthesizes with the first provider that succeeds.
    pub fn synthesize(&self, text: &str) -> Result<AudioRef, SpeechRegistryError> {
        if text.trim().is_empty() {
            return Err(SpeechRegistryError::EmptyInput(SpeechStage::Synthesize));
        }
        dispatch(
            &self.providers,
            &self.fallback_order,
            SpeechStage::Synthesize,
            |provider| provider.synthesize(text),
        )
    }

    /// Analyzes a pronunciation with the first feedback provider that succeeds.
    pub fn analyze(&self, request: &FeedbackRequest) -> Result<Feedback, SpeechRegistryError> {
        if request.spoken_word.trim().is_empty() {
            return Err(SpeechRegistryError::EmptyInput(SpeechStage::Analyze));
        }
        dispatch(
            &self.feedback_providers,
            &self.feedback_order,
            SpeechStage::Analyze,
            |provider| provider.analyze(request),
        )
    }
}

fn dispatch<P: ?Sized, T>(
    providers: &BTreeMap<String, Arc<P>>,
    order: &[String],
    stage: SpeechStage,
    call: impl Fn(&P) -> SpeechResult<T>,
) -> Result<T, SpeechRegistryError> {
    if order.is_empty() {
        return Err(SpeechRegistryError::NoProviders);
    }

    let mut failures = Vec::new();
    for provider_id in order {
        let Some(provider) = providers.get(provider_id) else {
            continue;
        };
        let started_at = Instant::now();
        match call(provider.as_ref()) {
            Ok(value) => {
                info!(
                    "event=speech_call module=speech status=ok stage={} provider={} fallbacks={} duration_ms={}",
                    stage.as_str(),
                    provider_id,
                    failures.len(),
                    started_at.elapsed().as_millis()
                );
                return Ok(value);
            }
            Err(err) => {
                warn!(
                    "event=speech_call module=speech status=error stage={} provider={} error_code={} retryable={} duration_ms={}",
                    stage.as_str(),
                    provider_id,
                    err.code,
                    err.retryable,
                    started_at.elapsed().as_millis()
                );
                failures.push(err);
            }
        }
    }

    Err(SpeechRegistryError::AllProvidersFailed(failures))
}

fn checked_provider_id<P: ?Sized>(
    raw: &str,
    registered: &BTreeMap<String, Arc<P>>,
) -> Result<String, SpeechRegistryError> {
    let provider_id = raw.trim().to_string();
    if !is_valid_provider_id(&provider_id) {
        return Err(SpeechRegistryError::InvalidProviderId(provider_id));
    }
    if registered.contains_key(provider_id.as_str()) {
        return Err(SpeechRegistryError::DuplicateProviderId(provider_id));
    }
    Ok(provider_id)
}

fn is_valid_provider_id(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::{SpeechRegistry, SpeechRegistryError};
    use crate::speech::feedback::{
        ExactMatchFeedback, Feedback, FeedbackRequest, FeedbackService,
    };
    use crate::speech::provider::{
        AudioClip, AudioRef, SpeechError, SpeechResult, SpeechService, SpeechStage, Transcript,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct MockProvider {
        provider_id: String,
        fail_with: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn ok(provider_id: &str) -> Arc<Self> {
            Arc::new(Self {
                provider_id: provider_id.to_string(),
                fail_with: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(provider_id: &str, code: &'static str) -> Arc<Self> {
            Arc::new(Self {
                provider_id: provider_id.to_string(),
                fail_with: Some(code),
                calls: AtomicUsize::new(0),
            })
        }

        fn result<T>(&self, stage: SpeechStage, value: T) -> SpeechResult<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.fail_with {
                Some(code) => Err(SpeechError::new(
                    self.provider_id.as_str(),
                    stage,
                    code,
                    "mock failure",
                    true,
                )),
                None => Ok(value),
            }
        }
    }

    impl SpeechService for MockProvider {
        fn provider_id(&self) -> &str {
            &self.provider_id
        }

        fn transcribe(&self, _audio: &AudioClip) -> SpeechResult<Transcript> {
            self.result(
                SpeechStage::Transcribe,
                Transcript {
                    text: format!("anor from {}", self.provider_id),
                    confidence: Some(0.9),
                    provider_id: self.provider_id.clone(),
                },
            )
        }

        fn synthesize(&self, text: &str) -> SpeechResult<AudioRef> {
            self.result(
                SpeechStage::Synthesize,
                AudioRef {
                    uri: format!("mem://{}/{}", self.provider_id, text.len()),
                    mime_type: "audio/mpeg".to_string(),
                    provider_id: self.provider_id.clone(),
                },
            )
        }
    }

    fn clip() -> AudioClip {
        AudioClip::new(vec![1, 2, 3], "audio/wav")
    }

    #[test]
    fn register_rejects_invalid_and_duplicate_ids() {
        let mut registry = SpeechRegistry::new();
        let err = registry.register(MockProvider::ok("Bad Id")).unwrap_err();
        assert!(matches!(err, SpeechRegistryError::InvalidProviderId(_)));

        registry.register(MockProvider::ok("muxlisa")).unwrap();
        let err = registry.register(MockProvider::ok("muxlisa")).unwrap_err();
        assert_eq!(
            err,
            SpeechRegistryError::DuplicateProviderId("muxlisa".to_string())
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn transcribe_falls_back_in_registration_order() {
        let primary = MockProvider::failing("primary", "timeout");
        let secondary = MockProvider::ok("secondary");
        let mut registry = SpeechRegistry::new();
        registry.register(primary.clone()).unwrap();
        registry.register(secondary.clone()).unwrap();

        let transcript = registry.transcribe(&clip()).unwrap();
        assert_eq!(transcript.provider_id, "secondary");
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fallback_order_can_be_replaced() {
        let mut registry = SpeechRegistry::new();
        registry.register(MockProvider::ok("a")).unwrap();
        registry.register(MockProvider::ok("b")).unwrap();
        registry.set_fallback_order(&["b", "a"]).unwrap();
        assert_eq!(registry.fallback_order(), ["b".to_string(), "a".to_string()]);

        let audio = registry.synthesize("Salom").unwrap();
        assert_eq!(audio.provider_id, "b");

        assert_eq!(
            registry.set_fallback_order(&["a", "a"]).unwrap_err(),
            SpeechRegistryError::DuplicateInOrder("a".to_string())
        );
        assert_eq!(
            registry.set_fallback_order(&["missing"]).unwrap_err(),
            SpeechRegistryError::ProviderNotFound("missing".to_string())
        );
    }

    #[test]
    fn all_failures_are_reported_in_call_order() {
        let mut registry = SpeechRegistry::new();
        registry.register(MockProvider::failing("a", "unauthorized")).unwrap();
        registry.register(MockProvider::failing("b", "timeout")).unwrap();

        match registry.transcribe(&clip()).unwrap_err() {
            SpeechRegistryError::AllProvidersFailed(errors) => {
                let codes = errors.iter().map(|err| err.code.as_str()).collect::<Vec<_>>();
                assert_eq!(codes, vec!["unauthorized", "timeout"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_input_and_empty_registry_are_rejected() {
        let registry = SpeechRegistry::new();
        assert_eq!(
            registry.transcribe(&clip()).unwrap_err(),
            SpeechRegistryError::NoProviders
        );
        assert_eq!(
            registry
                .transcribe(&AudioClip::new(Vec::new(), "audio/wav"))
                .unwrap_err(),
            SpeechRegistryError::EmptyInput(SpeechStage::Transcribe)
        );
        assert_eq!(
            registry.synthesize("  ").unwrap_err(),
            SpeechRegistryError::EmptyInput(SpeechStage::Synthesize)
        );
    }

    struct OfflineTutor;

    impl FeedbackService for OfflineTutor {
        fn provider_id(&self) -> &str {
            "tutor"
        }

        fn analyze(&self, _request: &FeedbackRequest) -> SpeechResult<Feedback> {
            Err(SpeechError::new(
                "tutor",
                SpeechStage::Analyze,
                "unauthorized",
                "missing api key",
                false,
            ))
        }
    }

    fn feedback_request(spoken: &str) -> FeedbackRequest {
        FeedbackRequest {
            expected_word: "Olma".to_string(),
            spoken_word: spoken.to_string(),
            letter: "O".to_string(),
        }
    }

    #[test]
    fn feedback_falls_back_to_exact_match() {
        let mut registry = SpeechRegistry::new();
        assert!(!registry.has_feedback());
        assert_eq!(
            registry.analyze(&feedback_request("olma")).unwrap_err(),
            SpeechRegistryError::NoProviders
        );

        registry.register_feedback(Arc::new(OfflineTutor)).unwrap();
        registry
            .register_feedback(Arc::new(ExactMatchFeedback))
            .unwrap();
        assert_eq!(
            registry
                .register_feedback(Arc::new(ExactMatchFeedback))
                .unwrap_err(),
            SpeechRegistryError::DuplicateProviderId("exact_match".to_string())
        );
        assert_eq!(registry.feedback_order(), ["tutor", "exact_match"]);
        assert!(registry.is_empty());

        let feedback = registry.analyze(&feedback_request("olma")).unwrap();
        assert!(feedback.is_correct);
        assert_eq!(feedback.provider_id, "exact_match");

        assert_eq!(
            registry.analyze(&feedback_request(" ")).unwrap_err(),
            SpeechRegistryError::EmptyInput(SpeechStage::Analyze)
        );
    }
}
