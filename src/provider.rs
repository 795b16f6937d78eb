use crate::TranslationError;
use itertools::Itertools;
use std::collections::HashMap;

/// Models accepted on the direct-hosting path.
pub const SUPPORTED_MODELS: [&str; 5] = [
    "gpt-4o",
    "gpt-4o-mini",
    "gpt-4-turbo",
    "gpt-4",
    "gpt-3.5-turbo",
];

/// Allow-list for the enterprise-hosted path: canonical model name mapped to
/// the deployment alias provisioned on the remote endpoint. Parsed once from
/// a `name:alias[,name:alias]*` configuration string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentMap(HashMap<String, String>);

impl DeploymentMap {
    pub fn parse(raw: &str) -> Self {
        let map = raw
            .split(',')
            .filter_map(|entry| entry.split_once(':'))
            .map(|(name, alias)| (name.trim().to_owned(), alias.trim().to_owned()))
            .filter(|(name, alias)| !name.is_empty() && !alias.is_empty())
            .collect();
        DeploymentMap(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn alias_for(&self, canonical_name: &str) -> Option<&str> {
        self.0.get(canonical_name).map(String::as_str)
    }

    pub fn contains_alias(&self, alias: &str) -> bool {
        self.0.values().any(|a| a == alias)
    }

    fn aliases(&self) -> Vec<String> {
        self.0.values().cloned().sorted().collect()
    }
}

/// The one behavioral difference between provider paths is which identifier
/// goes into the remote request's model field, so a provider is just a tag
/// plus the resolved identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedProvider {
    DirectModel { model: String },
    HostedDeployment { deployment: String },
}

impl ResolvedProvider {
    /// Direct-hosting path. Fails fast when the model is not supported,
    /// before any client is constructed.
    pub fn direct(model: &str) -> Result<Self, TranslationError> {
        if SUPPORTED_MODELS.contains(&model) {
            Ok(ResolvedProvider::DirectModel {
                model: model.to_owned(),
            })
        } else {
            Err(TranslationError::UnsupportedModelOrDeployment {
                requested: model.to_owned(),
                available: SUPPORTED_MODELS.iter().map(|m| (*m).to_owned()).collect(),
            })
        }
    }

    /// Enterprise-hosted path. Accepts either a configured alias or a
    /// canonical model name that maps to one; anything else fails fast.
    pub fn hosted(name_or_alias: &str, deployments: &DeploymentMap) -> Result<Self, TranslationError> {
        if let Some(alias) = deployments.alias_for(name_or_alias) {
            return Ok(ResolvedProvider::HostedDeployment {
                deployment: alias.to_owned(),
            });
        }
        if deployments.contains_alias(name_or_alias) {
            return Ok(ResolvedProvider::HostedDeployment {
                deployment: name_or_alias.to_owned(),
            });
        }
        Err(TranslationError::UnsupportedModelOrDeployment {
            requested: name_or_alias.to_owned(),
            available: deployments.aliases(),
        })
    }

    /// Identifier sent to the remote capability as the model field.
    pub fn identifier(&self) -> &str {
        match self {
            ResolvedProvider::DirectModel { model } => model,
            ResolvedProvider::HostedDeployment { deployment } => deployment,
        }
    }

    pub fn is_hosted(&self) -> bool {
        matches!(self, ResolvedProvider::HostedDeployment { .. })
    }
}
