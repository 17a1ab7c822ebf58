use anyhow::Result;
use async_trait::async_trait;

use prospect_common::ChannelKind;

use super::{ChannelConfig, DiscoverInput, DiscoverOutcome, DiscoveryChannel};

/// Placeholder for channels whose upstream access is not yet provisioned
/// (profile monitoring, social monitoring). Reports disabled and returns
/// empty success so a requested-but-gated channel can never fail a run.
pub struct GatedChannel {
    kind: ChannelKind,
}

impl GatedChannel {
    pub fn profile_monitor() -> Self {
        Self {
            kind: ChannelKind::ProfileMonitor,
        }
    }

    pub fn social_monitor() -> Self {
        Self {
            kind: ChannelKind::SocialMonitor,
        }
    }
}

#[async_trait]
impl DiscoveryChannel for GatedChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    fn is_enabled(&self, _config: &ChannelConfig) -> bool {
        false
    }

    async fn discover(&self, _input: &DiscoverInput) -> Result<DiscoverOutcome> {
        Ok(DiscoverOutcome::empty_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::super::SearchCriteria;
    use super::*;
    use crate::cancel::CancelToken;

    #[tokio::test]
    async fn gated_channels_never_fail() {
        for channel in [GatedChannel::profile_monitor(), GatedChannel::social_monitor()] {
            assert!(!channel.is_enabled(&ChannelConfig::default()));

            let out = channel
                .discover(&DiscoverInput {
                    config: ChannelConfig::default(),
                    criteria: SearchCriteria {
                        queries: vec!["ignored".into()],
                    },
                    cancel: CancelToken::new(),
                })
                .await
                .unwrap();

            assert!(out.success);
            assert!(out.results.is_empty());
            assert!(out.error.is_none());
        }
    }
}
