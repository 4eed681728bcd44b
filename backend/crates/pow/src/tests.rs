//! Cross-layer tests for the PoW crate
//! Dispatcher semantics through the router, then the full stack over loopback TCP

#[cfg(test)]
mod dispatcher_tests {
    use crate::application::authorizer::Authorizer;
    use crate::application::config::PowConfig;
    use crate::domain::entities::IssuedSeed;
    use crate::domain::repository::{DifficultyManager, SeedRepository};
    use crate::domain::services::check_stamp;
    use crate::domain::value_objects::{AuthorizerConfig, BitsRange};
    use crate::error::{PowError, PowResult};
    use crate::infra::memory::MemorySeedRepository;
    use crate::infra::quotes::StaticQuotes;
    use crate::presentation::codec::MessageType;
    use crate::presentation::dto::{Request, RequestMeta, Response};
    use crate::presentation::router::{PowRouter, RequestHandler, pow_router};
    use chrono::Utc;
    use kernel::error::app_error::AppError;
    use kernel::error::kind::ErrorKind;
    use platform::client::ClientIdentity;
    use std::time::Duration;

    const QUOTE: &[&str] = &["the only quote"];

    /// Difficulty source pinned to one level
    struct FixedDifficulty(i32);

    impl DifficultyManager for FixedDifficulty {
        fn record_request(&self) {}

        async fn current_difficulty_percent(&self) -> PowResult<i32> {
            Ok(self.0)
        }
    }

    /// Store whose every call fails
    struct BrokenStore;

    impl SeedRepository for BrokenStore {
        async fn store(&self, _seed: &IssuedSeed, _ttl: Duration) -> PowResult<()> {
            Err(PowError::StorageUnavailable("connection refused".into()))
        }

        async fn exists(&self, _seed: &IssuedSeed) -> PowResult<bool> {
            Err(PowError::StorageUnavailable("connection refused".into()))
        }

        async fn delete(&self, _seed: &IssuedSeed) -> PowResult<()> {
            Err(PowError::StorageUnavailable("connection refused".into()))
        }
    }

    /// Store that finds seeds but cannot delete them
    struct UndeletableStore(MemorySeedRepository);

    impl SeedRepository for UndeletableStore {
        async fn store(&self, seed: &IssuedSeed, ttl: Duration) -> PowResult<()> {
            self.0.store(seed, ttl).await
        }

        async fn exists(&self, seed: &IssuedSeed) -> PowResult<bool> {
            self.0.exists(seed).await
        }

        async fn delete(&self, _seed: &IssuedSeed) -> PowResult<()> {
            Err(PowError::StorageUnavailable("read-only replica".into()))
        }
    }

    fn config() -> PowConfig {
        PowConfig {
            bits: BitsRange::new(0, 8),
            ..Default::default()
        }
    }

    fn router(level: i32) -> PowRouter<MemorySeedRepository, FixedDifficulty, StaticQuotes> {
        pow_router(
            MemorySeedRepository::new(),
            FixedDifficulty(level),
            StaticQuotes::new(QUOTE),
            config(),
        )
    }

    fn client_authorizer() -> Authorizer<FixedDifficulty> {
        Authorizer::new(FixedDifficulty(0), &config())
    }

    fn request(ip: &str, kind: MessageType, payload: Vec<String>) -> Request {
        let identity = ClientIdentity::from_addr(format!("{ip}:5000").parse().unwrap());
        Request {
            kind,
            meta: RequestMeta::new(identity, Utc::now()),
            payload,
        }
    }

    async fn issue<H: RequestHandler>(router: &H, ip: &str) -> String {
        let response = router
            .handle(request(ip, MessageType::ClientAuthReq, vec![String::new()]))
            .await
            .unwrap();
        assert_eq!(response.kind, MessageType::ServerAuthResp);
        response.payload.into_iter().next().unwrap()
    }

    fn solve(seed: &str) -> String {
        let authorizer = client_authorizer();
        let (payload, cfg) = authorizer.parse_config_from(seed).unwrap();
        authorizer.generate_token(payload, &cfg).unwrap()
    }

    async fn redeem<H: RequestHandler>(
        router: &H,
        ip: &str,
        token: &str,
        seed: &str,
    ) -> Result<Response, AppError> {
        router
            .handle(request(
                ip,
                MessageType::ClientDataReq,
                vec![token.to_owned(), seed.to_owned()],
            ))
            .await
    }

    fn assert_fails_with(result: Result<Response, AppError>, expected: PowError) {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), expected.kind());
        assert_eq!(err.message(), expected.to_string());
    }

    #[tokio::test]
    async fn test_issued_seed_carries_difficulty() {
        let router = router(40);
        let seed = issue(&router, "127.0.0.1").await;
        assert!(seed.starts_with("v1;40;"));
    }

    #[tokio::test]
    async fn test_auth_then_data_succeeds_once() {
        let router = router(100);
        let seed = issue(&router, "127.0.0.1").await;
        let token = solve(&seed);

        let response = redeem(&router, "127.0.0.1", &token, &seed).await.unwrap();
        assert_eq!(response, Response::data("the only quote".to_string()));

        let replay = redeem(&router, "127.0.0.1", &token, &seed).await;
        assert_fails_with(replay, PowError::AuthNotRequested);
    }

    #[tokio::test]
    async fn test_seed_bound_to_identity() {
        let router = router(0);
        let seed = issue(&router, "127.0.0.1").await;
        let token = solve(&seed);

        let stolen = redeem(&router, "10.1.1.1", &token, &seed).await;
        assert_fails_with(stolen, PowError::AuthNotRequested);

        // The rightful owner can still redeem it
        assert!(redeem(&router, "127.0.0.1", &token, &seed).await.is_ok());
    }

    #[tokio::test]
    async fn test_token_at_other_difficulty_is_rejected() {
        let router = router(100);
        let seed = issue(&router, "127.0.0.1").await;
        let (payload, _) = AuthorizerConfig::parse(&seed).unwrap();
        let easier = client_authorizer()
            .generate_token(payload, &AuthorizerConfig::new(0))
            .unwrap();

        let result = redeem(&router, "127.0.0.1", &easier, &seed).await;
        assert_fails_with(result, PowError::DifficultyMismatch);
    }

    #[tokio::test]
    async fn test_token_for_other_seed_is_rejected() {
        let router = router(50);
        let first = issue(&router, "127.0.0.1").await;
        let second = issue(&router, "127.0.0.1").await;
        let token_for_first = solve(&first);

        let result = redeem(&router, "127.0.0.1", &token_for_first, &second).await;
        assert_fails_with(result, PowError::SeedMismatch);
    }

    #[tokio::test]
    async fn test_bad_proof_is_rejected_and_burns_seed() {
        let router = router(100);
        let seed = issue(&router, "127.0.0.1").await;
        let (payload, cfg) = AuthorizerConfig::parse(&seed).unwrap();

        // A stamp that claims 8 bits but whose digest falls short
        let forged = (0u64..)
            .map(|counter| format!("1:8:260101000000:{payload}::salt:{counter:x}"))
            .find(|stamp| !check_stamp(stamp, 8))
            .unwrap();
        let token = cfg.merge(&forged);

        let result = redeem(&router, "127.0.0.1", &token, &seed).await;
        assert_fails_with(result, PowError::InvalidProof);

        let retry = redeem(&router, "127.0.0.1", &solve(&seed), &seed).await;
        assert_fails_with(retry, PowError::AuthNotRequested);
    }

    #[tokio::test]
    async fn test_unparseable_token_is_rejected() {
        let router = router(0);
        let seed = issue(&router, "127.0.0.1").await;

        let err = redeem(&router, "127.0.0.1", "no-config-here", &seed)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(err.message().starts_with("parsing config from token"));
    }

    #[tokio::test]
    async fn test_data_request_needs_two_fields() {
        let router = router(0);
        let result = router
            .handle(request(
                "127.0.0.1",
                MessageType::ClientDataReq,
                vec!["only-one".into()],
            ))
            .await;
        assert_fails_with(result, PowError::InvalidPayload { expected: 2, got: 1 });
    }

    #[tokio::test]
    async fn test_server_message_types_are_unsupported() {
        let router = router(0);
        let result = router
            .handle(request("127.0.0.1", MessageType::ServerAuthResp, vec![]))
            .await;
        assert_fails_with(
            result,
            PowError::UnsupportedRequestType("s2c_auth_resp".into()),
        );
    }

    #[tokio::test]
    async fn test_store_failure_surfaces() {
        let router = pow_router(
            BrokenStore,
            FixedDifficulty(0),
            StaticQuotes::new(QUOTE),
            config(),
        );

        let err = router
            .handle(request("127.0.0.1", MessageType::ClientAuthReq, vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);

        let err = redeem(&router, "127.0.0.1", "t", "s").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }

    #[tokio::test]
    async fn test_failed_delete_does_not_block_redeem() {
        let router = pow_router(
            UndeletableStore(MemorySeedRepository::new()),
            FixedDifficulty(100),
            StaticQuotes::new(QUOTE),
            config(),
        );
        let seed = issue(&router, "127.0.0.1").await;
        let token = solve(&seed);

        let response = redeem(&router, "127.0.0.1", &token, &seed).await.unwrap();
        assert_eq!(response, Response::data("the only quote".to_string()));
    }

    #[tokio::test]
    async fn test_new_auth_request_replaces_outstanding_seed() {
        let router = router(50);
        let first = issue(&router, "127.0.0.1").await;
        let second = issue(&router, "127.0.0.1").await;

        let stale = redeem(&router, "127.0.0.1", &solve(&first), &first).await;
        assert_fails_with(stale, PowError::AuthNotRequested);

        assert!(redeem(&router, "127.0.0.1", &solve(&second), &second).await.is_ok());
    }
}

#[cfg(test)]
mod e2e_tests {
    use crate::application::authorizer::Authorizer;
    use crate::application::config::PowConfig;
    use crate::application::difficulty::{DifficultyController, NoOpDifficulty};
    use crate::application::request_quote::RequestQuoteUseCase;
    use crate::domain::repository::AdmissionGateway;
    use crate::domain::value_objects::BitsRange;
    use crate::error::ClientError;
    use crate::infra::memory::MemorySeedRepository;
    use crate::infra::quotes::StaticQuotes;
    use crate::presentation::client::{ClientConfig, PowClient};
    use crate::presentation::listener::{Listener, ListenerConfig};
    use crate::presentation::router::pow_router;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpStream;
    use tokio::sync::watch;
    use tokio::task::JoinHandle;

    const QUOTES: &[&str] = &["first", "second"];

    struct TestServer {
        addr: SocketAddr,
        shutdown: watch::Sender<()>,
        task: JoinHandle<()>,
        controller: DifficultyController,
    }

    impl TestServer {
        async fn start() -> Self {
            let config = pow_config();
            let (difficulty, controller) = DifficultyController::spawn(&config);
            let router = pow_router(
                MemorySeedRepository::new(),
                difficulty,
                StaticQuotes::new(QUOTES),
                config,
            );
            let listener = Listener::bind("127.0.0.1:0", ListenerConfig::default())
                .await
                .unwrap();
            let addr = listener.local_addr().unwrap();
            let (shutdown, rx) = watch::channel(());
            let task = tokio::spawn(listener.serve(Arc::new(router), rx));
            Self {
                addr,
                shutdown,
                task,
                controller,
            }
        }

        async fn stop(self) {
            self.shutdown.send(()).unwrap();
            self.task.await.unwrap();
            self.controller.stop().await;
        }
    }

    fn pow_config() -> PowConfig {
        PowConfig {
            bits: BitsRange::new(0, 8),
            ..Default::default()
        }
    }

    fn client(addr: SocketAddr) -> Arc<PowClient> {
        Arc::new(PowClient::new(addr.to_string(), ClientConfig::default()))
    }

    #[tokio::test]
    async fn test_quote_cycles() {
        let server = TestServer::start().await;
        let use_case = RequestQuoteUseCase::new(
            client(server.addr),
            Arc::new(Authorizer::new(NoOpDifficulty, &pow_config())),
        );

        for _ in 0..3 {
            let output = use_case.execute().await.unwrap();
            assert!(QUOTES.contains(&output.quote.as_str()));
            assert!(output.token.starts_with("v1;"));
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_replayed_data_request_is_refused() {
        let server = TestServer::start().await;
        let gateway = client(server.addr);
        let authorizer = Authorizer::new(NoOpDifficulty, &pow_config());

        let seed = gateway.request_seed().await.unwrap();
        let (payload, cfg) = authorizer.parse_config_from(&seed).unwrap();
        let token = authorizer.generate_token(payload, &cfg).unwrap();

        assert!(gateway.request_data(&token, &seed).await.is_ok());
        match gateway.request_data(&token, &seed).await {
            Err(ClientError::Server(message)) => {
                assert_eq!(message, "user did not request an auth")
            }
            other => panic!("unexpected result: {other:?}"),
        }

        server.stop().await;
    }

    #[tokio::test]
    async fn test_malformed_frame_then_valid_frame_on_one_connection() {
        let server = TestServer::start().await;

        let stream = TcpStream::connect(server.addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        writer.write_all(b"not a frame\n").await.unwrap();
        reader.read_line(&mut line).await.unwrap();
        assert!(line.starts_with("v1|error|"));

        line.clear();
        writer.write_all(b"v1|c2s_auth_req|\n").await.unwrap();
        reader.read_line(&mut line).await.unwrap();
        assert!(line.starts_with("v1|s2c_auth_resp|v1;"));
        assert!(line.ends_with('\n'));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_connection_closed_after_lifetime() {
        let server = TestServer::start().await;

        let stream = TcpStream::connect(server.addr).await.unwrap();
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        // Nothing is sent; the server hangs up once the lifetime runs out
        let read = reader.read_line(&mut line).await.unwrap();
        assert_eq!(read, 0);

        server.stop().await;
    }
}

#[cfg(test)]
mod digest_tests {
    use crate::domain::services::{count_leading_zero_bits, verify_difficulty};
    use platform::crypto::sha256;

    #[test]
    fn test_known_digest() {
        let digest = sha256(b"abc");
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(count_leading_zero_bits(&digest), 0);
    }

    #[test]
    fn test_leading_zero_fixtures() {
        let cases = [
            ("ffffffff", 0),
            ("7fffffff", 1),
            ("00ffffff", 8),
            ("000fffff", 12),
            ("00000100", 23),
            ("00000000", 32),
        ];
        for (fixture, expected) in cases {
            let bytes = hex::decode(fixture).unwrap();
            assert_eq!(count_leading_zero_bits(&bytes), expected, "{fixture}");
            assert!(verify_difficulty(&bytes, expected));
            assert!(!verify_difficulty(&bytes, expected + 1));
        }
    }
}
