// SPDX-License-Identifier: Apache-2.0

use proptest::prelude::*;
use proptest::test_runner::Config;
use taskboard_auth::{
    code_at, generate_secret, hash_password_with, provisioning_uri, qr_data_uri, verify_code,
    verify_password, AuthError, JwtSigner, TokenSubject, MIN_PBKDF2_ITERATIONS, TOTP_PERIOD_SECS,
};
use taskboard_model::{Email, Role, UserId};

const SECRET: &str = "integration-secret-integration-secret";

#[test]
fn enrolled_user_passes_password_then_totp_then_gets_token() {
    let stored_hash = hash_password_with("s3cretpass", MIN_PBKDF2_ITERATIONS);
    assert!(verify_password("s3cretpass", &stored_hash));

    let totp_secret = generate_secret();
    let uri = provisioning_uri(&totp_secret, "ola@example.com", "Taskboard");
    assert!(uri.contains(&format!("secret={totp_secret}")));
    assert!(qr_data_uri(&uri).expect("qr").starts_with("data:image/svg+xml;base64,"));

    let now = 1_700_000_000;
    let code = code_at(&totp_secret, now).expect("code");
    assert!(verify_code(&totp_secret, &code, now + TOTP_PERIOD_SECS));

    let email = Email::parse("Ola@Example.com").expect("email");
    let signer = JwtSigner::new(SECRET, 86_400);
    let token = signer
        .issue(
            &TokenSubject {
                user_id: UserId::new(7).expect("id"),
                email: &email,
                role: Role::User,
                first_name: "Ola",
                last_name: "Nowak",
            },
            now,
        )
        .expect("issue");
    let claims = signer.verify(&token, now + 1).expect("verify");
    assert_eq!(claims.sub, "ola@example.com");
    assert_eq!(claims.role, "ROLE_USER");
}

#[test]
fn token_past_ttl_is_expired() {
    let email = Email::parse("ola@example.com").expect("email");
    let signer = JwtSigner::new(SECRET, 5);
    let token = signer
        .issue(
            &TokenSubject {
                user_id: UserId::new(1).expect("id"),
                email: &email,
                role: Role::Admin,
                first_name: "A",
                last_name: "B",
            },
            0,
        )
        .expect("issue");
    assert_eq!(signer.verify(&token, 5), Err(AuthError::Expired));
}

proptest! {
    #![proptest_config(Config::with_cases(64))]
    #[test]
    fn current_code_always_verifies(now in 0_i64..4_000_000_000_i64) {
        let secret = "JBSWY3DPEHPK3PXP";
        let code = code_at(secret, now).expect("code");
        prop_assert_eq!(code.len(), 6);
        prop_assert!(verify_code(secret, &code, now));
    }
}
