//! `ConditionalProof2022` verification methods.
//!
//! A conditional method holds no key of its own. It is satisfied when
//! enough of its sub-conditions verify the token:
//!
//! - `conditionWeightedThreshold`: the weights of distinct satisfied
//!   conditions reach `threshold`
//! - `conditionThreshold`: at least `threshold` distinct conditions
//! - `conditionAnd`: every condition
//! - `conditionOr`: any condition
//! - `conditionDelegated`: the named method in another DID document
//!
//! Sub-conditions may themselves be conditional; each level re-enters
//! [`verify_jwt`](crate::verify_jwt) one step deeper.

use std::collections::BTreeSet;

use dialog_jws::{
    CONDITIONAL_PROOF_2022, DidResolutionResult, JwtError, Resolver, VerificationMethod,
    Verifier,
};

use crate::{
    authenticator::{DidAuthenticator, resolve_authenticator},
    codec::Envelope,
    options::VerifyOptions,
    verify::{names_method, verify_at_depth, verify_layers},
};

/// What a conditional method requires.
#[derive(Debug, PartialEq)]
enum Condition<'a> {
    /// Distinct satisfied conditions must weigh at least `threshold`.
    Weighted {
        conditions: Vec<(&'a VerificationMethod, u64)>,
        threshold: u64,
    },
    /// A method in another DID document must verify.
    Delegated(&'a str),
}

impl<'a> Condition<'a> {
    fn of(method: &'a VerificationMethod) -> Result<Self, JwtError> {
        if let Some(conditions) = &method.condition_weighted_threshold {
            Ok(Condition::Weighted {
                conditions: conditions.iter().map(|c| (&c.condition, c.weight)).collect(),
                threshold: threshold(method)?,
            })
        } else if let Some(conditions) = &method.condition_threshold {
            Ok(Condition::Weighted {
                conditions: unweighted(conditions),
                threshold: threshold(method)?,
            })
        } else if let Some(conditions) = &method.condition_and {
            let distinct: BTreeSet<&str> = conditions.iter().map(|c| c.id.as_str()).collect();
            Ok(Condition::Weighted {
                conditions: unweighted(conditions),
                threshold: distinct.len() as u64,
            })
        } else if let Some(conditions) = &method.condition_or {
            Ok(Condition::Weighted {
                conditions: unweighted(conditions),
                threshold: 1,
            })
        } else if let Some(delegate) = &method.condition_delegated {
            Ok(Condition::Delegated(delegate))
        } else {
            Err(JwtError::InvalidEnvelope(format!(
                "{} has no supported condition",
                method.id
            )))
        }
    }
}

fn unweighted(conditions: &[VerificationMethod]) -> Vec<(&VerificationMethod, u64)> {
    conditions.iter().map(|condition| (condition, 1)).collect()
}

fn threshold(method: &VerificationMethod) -> Result<u64, JwtError> {
    method.threshold.filter(|threshold| *threshold > 0).ok_or_else(|| {
        JwtError::InvalidEnvelope(format!("{} expects a positive threshold", method.id))
    })
}

fn not_met(method: &VerificationMethod) -> JwtError {
    JwtError::InvalidSignature(format!(
        "condition for authenticator {} is not met.",
        method.id
    ))
}

/// Check `envelope` against the conditional method `authenticator`.
///
/// Returns `authenticator` itself when its condition holds.
pub(crate) async fn verify_conditional_proof<R, V>(
    jwt: &str,
    envelope: &Envelope,
    authenticator: &VerificationMethod,
    options: &VerifyOptions,
    resolver: &R,
    verifier: &V,
    depth: usize,
) -> Result<VerificationMethod, JwtError>
where
    R: Resolver,
    V: Verifier,
{
    let resolution = options
        .authenticator
        .as_ref()
        .map(|context| context.resolution.clone())
        .unwrap_or_default();
    let check = Check {
        jwt,
        envelope,
        options,
        resolver,
        verifier,
        depth,
    };

    match Condition::of(authenticator)? {
        Condition::Weighted {
            conditions,
            threshold,
        } => {
            let mut satisfied: Vec<&str> = Vec::new();
            let mut weight: u64 = 0;

            for (condition, condition_weight) in conditions {
                if !check.holds(condition, &resolution).await? {
                    continue;
                }
                if satisfied.contains(&condition.id.as_str()) {
                    continue;
                }
                satisfied.push(&condition.id);
                weight = weight.saturating_add(condition_weight);
                tracing::trace!(condition = %condition.id, weight, threshold, "condition satisfied");
                if weight >= threshold {
                    return Ok(authenticator.clone());
                }
            }
            Err(not_met(authenticator))
        }
        Condition::Delegated(delegate) => {
            let context = resolve_authenticator(
                resolver,
                verifier,
                &envelope.header.alg,
                delegate,
                options.purpose(),
            )
            .await?;

            let candidates: Vec<&VerificationMethod> = if names_method(delegate) {
                let found = context
                    .authenticators
                    .iter()
                    .find(|method| method.id == delegate)
                    .ok_or_else(|| {
                        JwtError::NoSuitableKeys(format!(
                            "Could not find delegated authenticator {delegate} in its DID document"
                        ))
                    })?;
                vec![found]
            } else {
                context.authenticators.iter().collect()
            };

            for candidate in candidates {
                if check.holds(candidate, &context.resolution).await? {
                    return Ok(authenticator.clone());
                }
            }
            Err(not_met(authenticator))
        }
    }
}

/// The token under verification, for checking one condition at a time.
struct Check<'a, R, V> {
    jwt: &'a str,
    envelope: &'a Envelope,
    options: &'a VerifyOptions,
    resolver: &'a R,
    verifier: &'a V,
    depth: usize,
}

impl<R, V> Check<'_, R, V>
where
    R: Resolver,
    V: Verifier,
{
    /// Whether `condition` verifies the token.
    ///
    /// A signature mismatch is `Ok(false)`; every other failure is an
    /// error.
    async fn holds(
        &self,
        condition: &VerificationMethod,
        resolution: &DidResolutionResult,
    ) -> Result<bool, JwtError> {
        let outcome = if condition.method_type == CONDITIONAL_PROOF_2022 {
            let scoped = self.options.clone().with_authenticator(DidAuthenticator {
                authenticators: vec![condition.clone()],
                issuer: condition.id.clone(),
                resolution: resolution.clone(),
            });
            verify_at_depth(self.jwt, &scoped, self.resolver, self.verifier, self.depth + 1)
                .await
                .map(|_| ())
        } else {
            verify_layers(
                self.envelope,
                std::slice::from_ref(condition),
                self.verifier,
                self.options.max_depth(),
            )
            .await
            .map(|_| ())
        };

        match outcome {
            Ok(()) => Ok(true),
            Err(error) if error.is_invalid_signature() => {
                tracing::trace!(condition = %condition.id, %error, "condition not satisfied");
                Ok(false)
            }
            Err(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialog_jws::{ECDSA_SECP256K1_VERIFICATION_KEY_2019, WeightedCondition};
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    fn key(id: &str) -> VerificationMethod {
        VerificationMethod::new(id, ECDSA_SECP256K1_VERIFICATION_KEY_2019, "did:example:multi")
    }

    fn conditional(id: &str) -> VerificationMethod {
        VerificationMethod::new(id, CONDITIONAL_PROOF_2022, "did:example:multi")
    }

    #[test]
    fn and_requires_every_distinct_condition() -> TestResult {
        let mut method = conditional("did:example:multi#and");
        method.condition_and = Some(vec![key("#a"), key("#b"), key("#a")]);

        let Condition::Weighted { threshold, conditions } = Condition::of(&method)? else {
            panic!("expected a weighted condition");
        };
        assert_eq!(threshold, 2);
        assert_eq!(conditions.len(), 3);
        Ok(())
    }

    #[test]
    fn or_requires_one_condition() -> TestResult {
        let mut method = conditional("did:example:multi#or");
        method.condition_or = Some(vec![key("#a"), key("#b")]);

        let Condition::Weighted { threshold, .. } = Condition::of(&method)? else {
            panic!("expected a weighted condition");
        };
        assert_eq!(threshold, 1);
        Ok(())
    }

    #[test]
    fn weighted_conditions_keep_their_weights() -> TestResult {
        let mut method = conditional("did:example:multi#weighted");
        method.threshold = Some(3);
        method.condition_weighted_threshold = Some(vec![
            WeightedCondition {
                condition: key("#a"),
                weight: 2,
            },
            WeightedCondition {
                condition: key("#b"),
                weight: 1,
            },
        ]);

        let Condition::Weighted { threshold, conditions } = Condition::of(&method)? else {
            panic!("expected a weighted condition");
        };
        assert_eq!(threshold, 3);
        assert_eq!(
            conditions.iter().map(|(c, w)| (c.id.as_str(), *w)).collect::<Vec<_>>(),
            vec![("#a", 2), ("#b", 1)]
        );
        Ok(())
    }

    #[test]
    fn thresholds_must_be_positive() {
        let mut method = conditional("did:example:multi#threshold");
        method.condition_threshold = Some(vec![key("#a")]);
        assert!(matches!(Condition::of(&method), Err(JwtError::InvalidEnvelope(_))));

        method.threshold = Some(0);
        assert!(matches!(Condition::of(&method), Err(JwtError::InvalidEnvelope(_))));
    }

    #[test]
    fn delegation_names_another_method() -> TestResult {
        let mut method = conditional("did:example:multi#delegated");
        method.condition_delegated = Some("did:example:other#key".into());
        assert_eq!(Condition::of(&method)?, Condition::Delegated("did:example:other#key"));
        Ok(())
    }

    #[test]
    fn methods_without_conditions_are_rejected() {
        assert!(matches!(
            Condition::of(&conditional("did:example:multi#empty")),
            Err(JwtError::InvalidEnvelope(_))
        ));
    }
}
