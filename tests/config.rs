// ABOUTME: Integration tests for hosts file parsing and target resolution.
// ABOUTME: Tests YAML parsing, credential lookup from the environment and error kinds.

use remote_exec::config::*;
use std::path::Path;
use std::time::Duration;

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_hosts_file() {
        let yaml = r#"
hosts:
  web:
    host: web.example.com
"#;
        let hosts = HostsFile::from_yaml(yaml).unwrap();
        let web = hosts.get("web").unwrap();
        assert_eq!(web.host, "web.example.com");
        assert_eq!(web.port, 22);
        assert!(web.user.is_none());
        assert!(web.retry.is_none());
    }

    #[test]
    fn parse_full_hosts_file() {
        let yaml = r#"
hosts:
  db:
    host: 10.0.0.5
    port: 2222
    user: deploy
    key: /keys/deploy_ed25519
    quiet: true
    host_keys: trust-on-first-use
    known_hosts: /tmp/known_hosts
    connect_timeout: 5s
    command_timeout: 10m
    retry:
      max_attempts: 8
      initial_backoff: 250ms
      max_backoff: 1m
      multiplier: 3.0
"#;
        let hosts = HostsFile::from_yaml(yaml).unwrap();
        let config = hosts.session_config("db").unwrap();

        assert_eq!(config.hostname(), "10.0.0.5");
        assert_eq!(config.port(), 2222);
        assert_eq!(config.username(), "deploy");
        assert_eq!(config.key_path(), Some(Path::new("/keys/deploy_ed25519")));
        assert!(config.is_quiet());
        assert_eq!(config.host_key_policy(), HostKeyPolicy::TrustOnFirstUse);
        assert_eq!(config.known_hosts_path(), Some(Path::new("/tmp/known_hosts")));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(600)));

        let retry = config.retry();
        assert_eq!(retry.max_attempts, 8);
        assert_eq!(retry.initial_backoff, Duration::from_millis(250));
        assert_eq!(retry.max_backoff, Duration::from_secs(60));
        assert_eq!(retry.delay_after(2), Duration::from_millis(750));
    }

    #[test]
    fn partial_retry_section_keeps_defaults() {
        let yaml = r#"
hosts:
  web:
    host: web.example.com
    retry:
      max_attempts: 2
"#;
        let config = HostsFile::from_yaml(yaml)
            .unwrap()
            .session_config("web")
            .unwrap();
        let defaults = RetryPolicy::default();

        assert_eq!(config.retry().max_attempts, 2);
        assert_eq!(config.retry().initial_backoff, defaults.initial_backoff);
        assert_eq!(config.retry().max_backoff, defaults.max_backoff);
    }

    #[test]
    fn key_path_expands_home() {
        let yaml = r#"
hosts:
  web:
    host: web.example.com
    key: ~/.ssh/id_ed25519
"#;
        temp_env::with_var("HOME", Some("/home/ops"), || {
            let config = HostsFile::from_yaml(yaml)
                .unwrap()
                .session_config("web")
                .unwrap();
            assert_eq!(
                config.key_path(),
                Some(Path::new("/home/ops/.ssh/id_ed25519"))
            );
        });
    }

    #[test]
    fn malformed_yaml_is_a_hosts_file_error() {
        let err = HostsFile::from_yaml("hosts:\n  web: [unclosed").unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::HostsFile);
        assert!(err.to_string().starts_with("failed to parse hosts file"));
    }

    #[test]
    fn host_keys_default_to_accept_new() {
        let config = HostsFile::from_yaml("hosts:\n  web:\n    host: web.example.com\n")
            .unwrap()
            .session_config("web")
            .unwrap();
        assert_eq!(config.host_key_policy(), HostKeyPolicy::AcceptNew);

        let config = HostsFile::from_yaml(
            "hosts:\n  web:\n    host: web.example.com\n    host_keys: strict\n",
        )
        .unwrap()
        .session_config("web")
        .unwrap();
        assert_eq!(config.host_key_policy(), HostKeyPolicy::Strict);
    }

    #[test]
    fn unknown_host_key_policy_is_a_hosts_file_error() {
        let yaml = "hosts:\n  web:\n    host: a\n    host_keys: lenient\n";
        let err = HostsFile::from_yaml(yaml).unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::HostsFile);
        assert!(err.to_string().contains("unknown host key policy"), "{err}");
    }

    #[test]
    fn port_zero_in_hosts_file_is_a_target_error() {
        let hosts = HostsFile::from_yaml("hosts:\n  web:\n    host: a\n    port: 0\n").unwrap();

        let err = hosts.session_config("web").unwrap_err();

        assert_eq!(err.kind(), ConfigErrorKind::Target);
        assert!(err.to_string().contains("invalid port: 0"), "{err}");
    }

    #[test]
    fn missing_host_field_is_rejected() {
        let err = HostsFile::from_yaml("hosts:\n  web:\n    port: 22\n").unwrap_err();
        assert_eq!(err.kind(), ConfigErrorKind::HostsFile);
    }
}

mod credentials {
    use super::*;

    const YAML: &str = r#"
hosts:
  web:
    host: web.example.com
    password_env: REMOTE_EXEC_WEB_PASSWORD
"#;

    #[test]
    fn password_is_read_from_environment() {
        temp_env::with_var("REMOTE_EXEC_WEB_PASSWORD", Some("s3cret"), || {
            let config = HostsFile::from_yaml(YAML)
                .unwrap()
                .session_config("web")
                .unwrap();
            assert_eq!(config.password(), Some("s3cret"));
            assert!(!format!("{config:?}").contains("s3cret"));
        });
    }

    #[test]
    fn unset_password_variable_is_a_credential_error() {
        temp_env::with_var_unset("REMOTE_EXEC_WEB_PASSWORD", || {
            let err = HostsFile::from_yaml(YAML)
                .unwrap()
                .session_config("web")
                .unwrap_err();
            assert_eq!(err.kind(), ConfigErrorKind::Credential);
            assert!(err.to_string().contains("REMOTE_EXEC_WEB_PASSWORD"));
        });
    }
}

mod loading {
    use super::*;

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HOSTS_FILENAME);
        std::fs::write(&path, "hosts:\n  web:\n    host: web.example.com\n    user: ops\n")
            .unwrap();

        let config = HostsFile::load(&path)
            .unwrap()
            .session_config("web")
            .unwrap();

        assert_eq!(config.target(), "ops@web.example.com:22");
    }

    #[test]
    fn missing_file_is_a_hosts_file_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = HostsFile::load(&dir.path().join("absent.yml")).unwrap_err();

        assert_eq!(err.kind(), ConfigErrorKind::HostsFile);
        assert!(err.to_string().contains("absent.yml"));
    }

    #[test]
    fn unknown_name_is_a_target_error() {
        let hosts = HostsFile::from_yaml("hosts:\n  web:\n    host: a\n").unwrap();

        let err = hosts.session_config("db").unwrap_err();

        assert_eq!(err.kind(), ConfigErrorKind::Target);
        assert_eq!(err.to_string(), "unknown host: db");
    }
}

mod targets {
    use super::*;

    #[test]
    fn parse_full_target() {
        let config = SessionConfig::parse("deploy@10.1.2.3:2200").unwrap();
        assert_eq!(config.username(), "deploy");
        assert_eq!(config.hostname(), "10.1.2.3");
        assert_eq!(config.port(), 2200);
        assert_eq!(config.ssh_command_line(), "ssh -p 2200 deploy@10.1.2.3");
    }

    #[test]
    fn parse_host_only_uses_current_user() {
        temp_env::with_var("USER", Some("alice"), || {
            let config = SessionConfig::parse("web.example.com").unwrap();
            assert_eq!(config.username(), "alice");
            assert_eq!(config.port(), 22);
        });
    }

    #[test]
    fn parse_bracketed_ipv6_target() {
        let config = SessionConfig::parse("root@[2001:db8::7]:2200").unwrap();
        assert_eq!(config.username(), "root");
        assert_eq!(config.hostname(), "2001:db8::7");
        assert_eq!(config.port(), 2200);
        assert_eq!(config.target(), "root@[2001:db8::7]:2200");
    }

    #[test]
    fn parse_bare_ipv6_uses_default_port() {
        let config = SessionConfig::parse("deploy@2001:db8::7").unwrap();
        assert_eq!(config.hostname(), "2001:db8::7");
        assert_eq!(config.port(), 22);
    }

    #[test]
    fn invalid_targets_are_rejected() {
        for input in [
            "",
            "user@",
            "host:0",
            "host:abc",
            "host:70000",
            "[::1",
            "[::1]:0",
            "[2001:db8::7]22",
        ] {
            let err = SessionConfig::parse(input).unwrap_err();
            assert_eq!(err.kind(), ConfigErrorKind::Target, "input: {input:?}");
        }
    }
}
