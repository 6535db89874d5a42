use std::fmt;
use std::path::{Path, PathBuf};

use kube::config::{KubeConfigOptions, Kubeconfig};

use crate::error::ConfigError;

/// Where the cluster credentials came from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    InCluster,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "kubeconfig {}", path.display()),
            Self::InCluster => write!(f, "in-cluster service account"),
        }
    }
}

/// Default kubeconfig location under the user's home directory
pub fn default_kubeconfig_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".kube").join("config"))
}

/// Pick the kubeconfig file to use, if any
///
/// The explicit path wins over the default one; a path that does not exist
/// yields `None`, which means in-cluster discovery.
pub fn kubeconfig_path(explicit: Option<&Path>, default: Option<PathBuf>) -> Option<PathBuf> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => default?,
    };

    if path.is_file() {
        Some(path)
    } else {
        if explicit.is_some() {
            tracing::warn!(
                path = %path.display(),
                "kubeconfig not found, falling back to in-cluster config"
            );
        }
        None
    }
}

/// Build a cluster configuration from a kubeconfig file or in-cluster credentials
pub async fn resolve_config(
    explicit: Option<&Path>,
) -> Result<(kube::Config, ConfigSource), ConfigError> {
    match kubeconfig_path(explicit, default_kubeconfig_path()) {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            let config = kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|source| ConfigError::Load {
                    path: path.clone(),
                    source,
                })?;
            Ok((config, ConfigSource::File(path)))
        }
        None => {
            let config = kube::Config::incluster()?;
            Ok((config, ConfigSource::InCluster))
        }
    }
}

/// Kubernetes client wrapper
#[derive(Clone)]
pub struct KubeClient {
    client: kube::Client,
    source: ConfigSource,
}

impl KubeClient {
    /// Resolve credentials and create a client
    pub async fn new(kubeconfig: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, source) = resolve_config(kubeconfig).await?;
        tracing::debug!(source = %source, cluster = %config.cluster_url, "resolved cluster config");

        let client = kube::Client::try_from(config).map_err(ConfigError::Client)?;
        Ok(Self { client, source })
    }

    /// The underlying kube client
    pub fn client(&self) -> kube::Client {
        self.client.clone()
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
clusters:
- name: test
  cluster:
    server: https://127.0.0.1:6443
contexts:
- name: test
  context:
    cluster: test
    user: test
    namespace: apps
current-context: test
users:
- name: test
  user:
    token: abc123
"#;

    fn write_kubeconfig() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(KUBECONFIG.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_explicit_path_wins() {
        let file = write_kubeconfig();
        let default = PathBuf::from("/nonexistent/.kube/config");
        assert_eq!(
            kubeconfig_path(Some(file.path()), Some(default)),
            Some(file.path().to_path_buf())
        );
    }

    #[test]
    fn test_default_path_used_when_present() {
        let file = write_kubeconfig();
        assert_eq!(
            kubeconfig_path(None, Some(file.path().to_path_buf())),
            Some(file.path().to_path_buf())
        );
    }

    #[test]
    fn test_missing_file_means_in_cluster() {
        let missing = Path::new("/nonexistent/kubeconfig");
        assert_eq!(kubeconfig_path(Some(missing), None), None);
        assert_eq!(kubeconfig_path(None, Some(missing.to_path_buf())), None);
        assert_eq!(kubeconfig_path(None, None), None);
    }

    #[test]
    fn test_missing_explicit_file_skips_default() {
        let default = write_kubeconfig();
        let missing = Path::new("/nonexistent/kubeconfig");
        assert_eq!(
            kubeconfig_path(Some(missing), Some(default.path().to_path_buf())),
            None
        );
    }

    #[tokio::test]
    async fn test_resolve_from_file() {
        let file = write_kubeconfig();
        let (config, source) = resolve_config(Some(file.path())).await.unwrap();

        assert_eq!(source, ConfigSource::File(file.path().to_path_buf()));
        assert_eq!(config.cluster_url.host(), Some("127.0.0.1"));
        assert_eq!(config.cluster_url.port_u16(), Some(6443));
        assert_eq!(config.default_namespace, "apps");
    }

    #[tokio::test]
    async fn test_resolve_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"clusters: [not, a, kubeconfig").unwrap();

        let err = resolve_config(Some(file.path())).await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
