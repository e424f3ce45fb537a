//! Resource loaders: source reference in, decoded PCM out.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client as ReqwestClient;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

use mixdown_audio::AudioBuffer;
use mixdown_audio::codec::decode_file;

use crate::error::LoadError;
use crate::scope::Scope;

/// Default fetch timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Turns a source reference into a decoded buffer.
///
/// Implementations may stage intermediate files in the scope's work
/// directory. Anything they register must be released before returning.
#[async_trait]
pub trait ResourceLoader: Send + Sync {
    async fn load(&self, source: &str, scope: &Scope) -> Result<AudioBuffer, LoadError>;
}

/// Options for [`HttpLoader`].
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Bound on one whole fetch.
    pub timeout: Duration,
    /// Whether `file://` URLs and plain paths are accepted.
    pub allow_local_files: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            allow_local_files: false,
        }
    }
}

/// Loads audio over HTTP(S), and optionally from the local filesystem.
pub struct HttpLoader {
    client: ReqwestClient,
    allow_local_files: bool,
}

enum Location {
    Remote(Url),
    Local(PathBuf),
}

impl HttpLoader {
    /// Creates a loader.
    pub fn new(options: LoaderOptions) -> Result<Self, LoadError> {
        let client = ReqwestClient::builder()
            .timeout(options.timeout)
            .user_agent(concat!("mixdown/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            allow_local_files: options.allow_local_files,
        })
    }

    fn locate(&self, source: &str) -> Result<Location, LoadError> {
        match Url::parse(source) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Location::Remote(url)),
                "file" if self.allow_local_files => url
                    .to_file_path()
                    .map(Location::Local)
                    .map_err(|_| LoadError::Acquisition(format!("invalid file url: {}", source))),
                scheme => Err(LoadError::Acquisition(format!(
                    "unsupported source scheme: {}",
                    scheme
                ))),
            },
            Err(_) if self.allow_local_files => Ok(Location::Local(PathBuf::from(source))),
            Err(e) => Err(LoadError::Acquisition(format!(
                "invalid source '{}': {}",
                source, e
            ))),
        }
    }

    async fn fetch(&self, url: Url, scope: &Scope) -> Result<AudioBuffer, LoadError> {
        let ext = url_extension(&url).unwrap_or("bin").to_ascii_lowercase();
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;

        let artifact = scope.temp_file(&ext);
        let mut file = tokio::fs::File::create(artifact.path()).await?;
        let mut stream = response.bytes_stream();
        let mut received = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            received += chunk.len();
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);
        debug!("fetched {} ({} bytes)", url, received);

        let buffer = decode_blocking(artifact.path().to_path_buf()).await;
        // The download is not needed once decoded.
        drop(artifact);
        buffer
    }
}

#[async_trait]
impl ResourceLoader for HttpLoader {
    async fn load(&self, source: &str, scope: &Scope) -> Result<AudioBuffer, LoadError> {
        match self.locate(source)? {
            Location::Remote(url) => self.fetch(url, scope).await,
            Location::Local(path) => {
                if !tokio::fs::try_exists(&path).await? {
                    return Err(LoadError::Acquisition(format!(
                        "file not found: {}",
                        path.display()
                    )));
                }
                decode_blocking(path).await
            }
        }
    }
}

async fn decode_blocking(path: PathBuf) -> Result<AudioBuffer, LoadError> {
    tokio::task::spawn_blocking(move || decode_file(&path))
        .await
        .map_err(|e| LoadError::Decode(format!("decoder task failed: {}", e)))?
        .map_err(LoadError::from)
}

fn url_extension(url: &Url) -> Option<&str> {
    let name = url.path_segments()?.next_back()?;
    let ext = Path::new(name).extension()?.to_str()?;
    (!ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixdown_audio::Format;
    use mixdown_audio::codec::wav;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn wav_bytes() -> Vec<u8> {
        let buf = AudioBuffer::new(Format::mono(8000), vec![100; 800]).unwrap();
        wav::encode(&buf).unwrap()
    }

    /// Serves one canned HTTP response per connection.
    async fn serve(status: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut sock, _)) = listener.accept().await {
                let body = body.clone();
                tokio::spawn(async move {
                    let mut req = [0u8; 2048];
                    let _ = sock.read(&mut req).await;
                    let head = format!(
                        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        status,
                        body.len()
                    );
                    let _ = sock.write_all(head.as_bytes()).await;
                    let _ = sock.write_all(&body).await;
                    let _ = sock.shutdown().await;
                });
            }
        });
        format!("http://{}", addr)
    }

    fn scope() -> (tempfile::TempDir, Scope) {
        let root = tempfile::tempdir().unwrap();
        let scope = Scope::new(root.path()).unwrap();
        (root, scope)
    }

    #[test]
    fn test_url_extension() {
        let url = Url::parse("https://cdn.example.com/a/voice.MP3?sig=1").unwrap();
        assert_eq!(url_extension(&url), Some("MP3"));
        let url = Url::parse("https://cdn.example.com/a/").unwrap();
        assert_eq!(url_extension(&url), None);
    }

    #[tokio::test]
    async fn test_fetch_and_decode() {
        let base = serve("200 OK", wav_bytes()).await;
        let loader = HttpLoader::new(LoaderOptions::default()).unwrap();
        let (_root, scope) = scope();

        let buf = loader.load(&format!("{}/clip.wav", base), &scope).await.unwrap();
        assert_eq!(buf.format(), Format::mono(8000));
        assert_eq!(buf.frames(), 800);
        assert_eq!(scope.live(), 0);
        assert_eq!(std::fs::read_dir(scope.work_dir()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_http_error_is_acquisition() {
        let base = serve("404 Not Found", Vec::new()).await;
        let loader = HttpLoader::new(LoaderOptions::default()).unwrap();
        let (_root, scope) = scope();

        let err = loader.load(&format!("{}/missing.mp3", base), &scope).await.unwrap_err();
        assert!(matches!(err, LoadError::Acquisition(_)), "{:?}", err);
        assert_eq!(scope.live(), 0);
    }

    #[tokio::test]
    async fn test_garbage_is_decode_error() {
        let base = serve("200 OK", b"definitely not audio".to_vec()).await;
        let loader = HttpLoader::new(LoaderOptions::default()).unwrap();
        let (_root, scope) = scope();

        let err = loader.load(&format!("{}/x.mp3", base), &scope).await.unwrap_err();
        assert!(matches!(err, LoadError::Decode(_)), "{:?}", err);
        assert_eq!(scope.live(), 0);
    }

    #[tokio::test]
    async fn test_local_files_gated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.wav");
        std::fs::write(&path, wav_bytes()).unwrap();
        let (_root, scope) = scope();
        let source = path.to_string_lossy().to_string();

        let strict = HttpLoader::new(LoaderOptions::default()).unwrap();
        let err = strict.load(&source, &scope).await.unwrap_err();
        assert!(matches!(err, LoadError::Acquisition(_)));

        let open = HttpLoader::new(LoaderOptions {
            allow_local_files: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(open.load(&source, &scope).await.unwrap().frames(), 800);

        let file_url = Url::from_file_path(&path).unwrap().to_string();
        assert_eq!(open.load(&file_url, &scope).await.unwrap().frames(), 800);

        let err = open
            .load(&dir.path().join("nope.wav").to_string_lossy(), &scope)
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Acquisition(_)));
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let loader = HttpLoader::new(LoaderOptions::default()).unwrap();
        let (_root, scope) = scope();
        let err = loader.load("ftp://example.com/a.mp3", &scope).await.unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }
}
