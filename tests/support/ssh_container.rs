// ABOUTME: SSH server container shared by the integration tests.
// ABOUTME: Starts a password-authenticated sshd with bollard and removes it at exit.

use bollard::Docker;
use bollard::models::{ContainerCreateBody, HostConfig, PortBinding};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, InspectContainerOptions, RemoveContainerOptions,
    StartContainerOptions,
};
use futures::StreamExt;
use remote_exec::config::HostKeyPolicy;
use remote_exec::{Remote, RetryPolicy, SessionConfig};
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const IMAGE: &str = "lscr.io/linuxserver/openssh-server:latest";
const SSHD_PORT: &str = "2222/tcp";
pub const TEST_USER: &str = "testuser";
pub const TEST_PASSWORD: &str = "remote-exec-test";

/// Id of the started container, removed when the test process exits.
static CONTAINER_ID: OnceLock<String> = OnceLock::new();

#[ctor::dtor]
fn remove_container_on_exit() {
    let Some(id) = CONTAINER_ID.get() else {
        return;
    };
    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return;
    };
    rt.block_on(async {
        if let Ok(docker) = Docker::connect_with_local_defaults() {
            let _ = docker
                .remove_container(
                    id,
                    Some(RemoveContainerOptions {
                        force: true,
                        ..Default::default()
                    }),
                )
                .await;
        }
    });
}

static SHARED_CONTAINER: tokio::sync::OnceCell<SshContainer> = tokio::sync::OnceCell::const_new();

/// Get the shared SSH container, starting it on first use.
pub async fn shared_container() -> &'static SshContainer {
    SHARED_CONTAINER
        .get_or_init(|| async {
            SshContainer::start()
                .await
                .expect("failed to start SSH container")
        })
        .await
}

/// Running sshd reachable on a Docker-assigned localhost port.
pub struct SshContainer {
    port: u16,
    known_hosts: tempfile::TempDir,
}

impl SshContainer {
    async fn start() -> Result<Self, BoxError> {
        super::init_tracing();
        let docker = Docker::connect_with_local_defaults()?;

        let mut pull = docker.create_image(
            Some(CreateImageOptions {
                from_image: Some(IMAGE.to_string()),
                ..Default::default()
            }),
            None,
            None,
        );
        while let Some(progress) = pull.next().await {
            progress?;
        }

        // An empty host port lets Docker pick a free one.
        let bindings = HashMap::from([(
            SSHD_PORT.to_string(),
            Some(vec![PortBinding {
                host_ip: Some("127.0.0.1".to_string()),
                host_port: None,
            }]),
        )]);
        let body = ContainerCreateBody {
            image: Some(IMAGE.to_string()),
            env: Some(vec![
                "PUID=1000".to_string(),
                "PGID=1000".to_string(),
                format!("USER_NAME={TEST_USER}"),
                "PASSWORD_ACCESS=true".to_string(),
                format!("USER_PASSWORD={TEST_PASSWORD}"),
            ]),
            host_config: Some(HostConfig {
                port_bindings: Some(bindings),
                ..Default::default()
            }),
            ..Default::default()
        };

        let created = docker
            .create_container(
                Some(CreateContainerOptions {
                    name: Some(format!("remote-exec-sshd-{}", std::process::id())),
                    ..Default::default()
                }),
                body,
            )
            .await?;
        let _ = CONTAINER_ID.set(created.id.clone());

        docker
            .start_container(&created.id, None::<StartContainerOptions>)
            .await?;

        let container = Self {
            port: Self::published_port(&docker, &created.id).await?,
            known_hosts: tempfile::tempdir()?,
        };
        container.wait_until_ready().await?;
        Ok(container)
    }

    async fn published_port(docker: &Docker, id: &str) -> Result<u16, BoxError> {
        let details = docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await?;
        let port = details
            .network_settings
            .and_then(|settings| settings.ports)
            .and_then(|mut ports| ports.remove(SSHD_PORT))
            .flatten()
            .and_then(|bindings| bindings.into_iter().find_map(|b| b.host_port))
            .ok_or("sshd port was not published")?;
        Ok(port.parse()?)
    }

    /// Poll until a password login succeeds; sshd accepts connections before
    /// the test user exists.
    async fn wait_until_ready(&self) -> Result<(), BoxError> {
        let probe = Remote::new(
            self.session_config()
                .with_quiet(true)
                .with_retry(RetryPolicy::no_retry())
                .with_connect_timeout(Duration::from_secs(2)),
        );
        for _ in 0..60 {
            if probe.uptime().await.is_some() {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        Err("SSH container did not become ready in time".into())
    }

    /// Password-authenticated configuration for this container.
    pub fn session_config(&self) -> SessionConfig {
        self.unauthenticated_config().with_password(TEST_PASSWORD)
    }

    /// Configuration with no password or key file, so authentication falls
    /// back to the agent and the default keys under `HOME`.
    pub fn unauthenticated_config(&self) -> SessionConfig {
        SessionConfig::new("127.0.0.1")
            .with_username(TEST_USER)
            .with_port(self.port)
            .expect("published port is non-zero")
            .with_host_key_policy(HostKeyPolicy::TrustOnFirstUse)
            .with_known_hosts_path(self.known_hosts.path().join("known_hosts"))
            .with_retry(
                RetryPolicy::default()
                    .with_max_attempts(3)
                    .with_backoff(Duration::from_millis(200), Duration::from_secs(1)),
            )
    }
}
