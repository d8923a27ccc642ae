//! テスト: Vault・Authority・Factory を通したエンドツーエンドシナリオ

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
    use serde_json::json;

    use crate::authority::HmacAuthority;
    use crate::claims::{epoch_now, ClaimSet, JwtPayload};
    use crate::config::{AuthorityConfig, TokenVaultConfig};
    use crate::error::TokenVaultError;
    use crate::factory::{build_authority, build_token_vault};
    use crate::token_type::TokenType;
    use crate::vault::{IdentityProvider, TokenOptions, TokenVault};

    const TEST_ISSUER: &str = "https://issuer.example";
    const TEST_AUDIENCE: &str = "https://api.example";

    /// テスト用ユーザー。
    #[derive(Debug, Clone, PartialEq)]
    struct TestUser {
        id: String,
        email: String,
    }

    /// テスト用の IdentityProvider 実装。
    struct TestIdentityProvider {
        users: Vec<TestUser>,
    }

    #[async_trait]
    impl IdentityProvider<TestUser> for TestIdentityProvider {
        fn user_identifier(&self, user: &TestUser) -> String {
            user.id.clone()
        }

        async fn find_unique_user(&self, user_id: &str) -> Option<TestUser> {
            self.users.iter().find(|u| u.id == user_id).cloned()
        }
    }

    fn test_user() -> TestUser {
        TestUser {
            id: "42".to_string(),
            email: "user42@example.com".to_string(),
        }
    }

    fn identity_with_test_user() -> Arc<TestIdentityProvider> {
        Arc::new(TestIdentityProvider {
            users: vec![test_user()],
        })
    }

    fn tempdir_path(dir: &tempfile::TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    // --- HMAC エンドツーエンド ---

    #[tokio::test]
    async fn test_hmac_end_to_end() {
        let mut vault = TokenVault::new(identity_with_test_user(), TEST_ISSUER, TEST_AUDIENCE);
        vault.register_authority(TokenType::AccessToken, HmacAuthority::new("s3cr3t").into());

        // 発行 → 検証 → ユーザー解決
        let token = vault
            .create_access_token(&test_user(), TokenOptions::new())
            .unwrap();
        let verified = vault.decode_token(TokenType::AccessToken, &token).unwrap();
        let resolved = vault
            .get_user_and_scope_claims(&verified.payload)
            .await
            .unwrap();

        assert_eq!(resolved.user, test_user());
        assert_eq!(resolved.scope, vec!["api".to_string()]);
        assert_eq!(verified.payload["iss"], json!(TEST_ISSUER));
        assert_eq!(verified.payload["aud"], json!(TEST_AUDIENCE));
    }

    // --- RSA ファイルパス構築エンドツーエンド ---

    #[tokio::test]
    async fn test_rsa_from_missing_files_generates_and_verifies_with_reloaded_key() {
        let dir = tempfile::tempdir().unwrap();
        let public_path = tempdir_path(&dir, "rsa-public.pem");
        let private_path = tempdir_path(&dir, "rsa-private.pem");

        // 存在しないパスからの構築で鍵ペアが生成・永続化される
        let config = AuthorityConfig::rsa(TokenType::AccessToken, &public_path, &private_path);
        let registration = build_authority(&config, None).await.unwrap();

        let mut vault = TokenVault::new(identity_with_test_user(), TEST_ISSUER, TEST_AUDIENCE);
        vault.register_authority(registration.token_type, registration.authority);
        let token = vault
            .create_access_token(&test_user(), TokenOptions::new())
            .unwrap();

        // 永続化された公開鍵を独立に読み直して署名を検証する
        let public_pem = tokio::fs::read_to_string(&public_path).await.unwrap();
        let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes()).unwrap();
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;
        validation.set_issuer(&[TEST_ISSUER]);
        validation.set_audience(&[TEST_AUDIENCE]);

        let data = decode::<JwtPayload>(&token, &decoding_key, &validation).unwrap();
        assert_eq!(data.claims["userId"], json!("42"));
        assert_eq!(data.claims["scope"], json!(["api"]));
    }

    // --- 設定一式からの Vault 組み立て ---

    #[tokio::test]
    async fn test_build_token_vault_with_mixed_authorities() {
        let dir = tempfile::tempdir().unwrap();
        let config = TokenVaultConfig::new(TEST_ISSUER, TEST_AUDIENCE)
            .with_access_token_lifetime(900)
            .with_authority(AuthorityConfig::hsa(TokenType::AccessToken, "s3cr3t"))
            .with_authority(AuthorityConfig::rsa(
                TokenType::RefreshToken,
                &tempdir_path(&dir, "rsa-public.pem"),
                &tempdir_path(&dir, "rsa-private.pem"),
            ))
            .with_authority(AuthorityConfig::eddsa(
                TokenType::AuthorizationCode,
                &tempdir_path(&dir, "ed-public.pem"),
                &tempdir_path(&dir, "ed-private.pem"),
            ));
        config.validate().unwrap();

        let vault = build_token_vault(&config, identity_with_test_user(), None)
            .await
            .unwrap();

        // 3 種別すべてで発行 → 検証が通る
        for token_type in [
            TokenType::AccessToken,
            TokenType::RefreshToken,
            TokenType::AuthorizationCode,
        ] {
            let token = vault
                .create_token(token_type, &test_user(), TokenOptions::new())
                .unwrap();
            let verified = vault.decode_token(token_type, &token).unwrap();
            assert_eq!(verified.payload["userId"], json!("42"));
        }

        // 設定の accessTokenLifetime が適用されている
        let token = vault
            .create_access_token(&test_user(), TokenOptions::new())
            .unwrap();
        let verified = vault.decode_token(TokenType::AccessToken, &token).unwrap();
        let exp = verified.payload["exp"].as_u64().unwrap();
        assert!(exp <= epoch_now() + 900);
    }

    // --- 種別間の Authority 分離 ---

    #[tokio::test]
    async fn test_token_signed_for_one_type_fails_under_another_authority() {
        let mut vault = TokenVault::new(identity_with_test_user(), TEST_ISSUER, TEST_AUDIENCE);
        vault.register_authority(TokenType::AccessToken, HmacAuthority::new("access-key").into());
        vault.register_authority(
            TokenType::RefreshToken,
            HmacAuthority::new("refresh-key").into(),
        );

        let token = vault
            .create_access_token(&test_user(), TokenOptions::new())
            .unwrap();

        // アクセストークンをリフレッシュ用 Authority で検証すると署名不一致
        let result = vault.decode_token(TokenType::RefreshToken, &token);
        assert!(matches!(
            result,
            Err(TokenVaultError::SignatureVerificationFailed)
        ));
    }

    // --- 期限切れトークンの拒否 ---

    #[tokio::test]
    async fn test_expired_token_rejected_via_vault() {
        let authority: crate::authority::TokenAuthority = HmacAuthority::new("s3cr3t").into();
        let mut vault = TokenVault::new(identity_with_test_user(), TEST_ISSUER, TEST_AUDIENCE);
        vault.register_authority(TokenType::AccessToken, authority.clone());

        // 過去の exp を持つクレームセットを直接署名する
        let claim_set = ClaimSet::new()
            .set_user_id("42")
            .set_scope(&["api".to_string()])
            .set_issued_at(epoch_now() - 120)
            .set_expiration(epoch_now() - 60)
            .set_issuer(TEST_ISSUER)
            .set_audience(TEST_AUDIENCE);
        let token = authority.sign(&claim_set).unwrap();

        let result = vault.decode_token(TokenType::AccessToken, &token);
        assert!(matches!(
            result,
            Err(TokenVaultError::ClaimValidationFailed(_))
        ));
    }
}
