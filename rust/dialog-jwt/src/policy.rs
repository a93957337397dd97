//! Temporal and audience checks on verified claims.

use dialog_jws::JwtError;

use crate::{claims::Claims, options::VerifyOptions};

/// Run every enabled check against `claims` as of `now`.
pub fn check_claims(claims: &Claims, options: &VerifyOptions, now: u64) -> Result<(), JwtError> {
    check_temporal(claims, options, now)?;
    check_audience(claims, options)
}

/// `nbf`, `iat` and `exp`, each with the configured skew.
///
/// When `nbf` is present it replaces the `iat` check.
pub fn check_temporal(claims: &Claims, options: &VerifyOptions, now: u64) -> Result<(), JwtError> {
    let policies = &options.policies;
    let skew = options.skew();
    let latest = now.saturating_add(skew);

    match claims.nbf {
        Some(nbf) => {
            if policies.nbf && nbf > latest {
                return Err(JwtError::PolicyViolation(format!(
                    "JWT not valid before nbf: {nbf}"
                )));
            }
        }
        None => match claims.iat {
            Some(iat) if policies.iat && iat > latest => {
                return Err(JwtError::PolicyViolation(format!(
                    "JWT not valid yet (issued in the future) iat: {iat}"
                )));
            }
            _ => {}
        },
    }

    match claims.exp {
        Some(exp) if policies.exp && exp.saturating_add(skew) <= now => Err(
            JwtError::PolicyViolation(format!("JWT has expired: exp: {exp} < now: {now}")),
        ),
        _ => Ok(()),
    }
}

/// When `aud` is present, one of its entries must be the configured
/// audience or callback URL.
pub fn check_audience(claims: &Claims, options: &VerifyOptions) -> Result<(), JwtError> {
    let Some(aud) = &claims.aud else {
        return Ok(());
    };
    if !options.policies.aud {
        return Ok(());
    }

    if options.audience.is_none() && options.callback_url.is_none() {
        return Err(JwtError::InvalidAudience(
            "JWT audience is required but your app address has not been configured".into(),
        ));
    }

    let accepted = [options.audience.as_deref(), options.callback_url.as_deref()];
    if aud.iter().any(|entry| accepted.contains(&Some(entry))) {
        Ok(())
    } else {
        Err(JwtError::InvalidAudience(
            "JWT audience does not match your DID or callback url".into(),
        ))
    }
}
