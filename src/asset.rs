//! Downloading generated images to disk.

use crate::error::{ImageGenError, Result};
use crate::image::GenerationResult;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Streams the image at `url` into `path`, creating parent directories.
///
/// Only `http` and `https` URLs can be fetched. Storage URIs such as
/// `gs://bucket/object` are rejected.
pub async fn download_image(url: &str, path: impl AsRef<Path>) -> Result<PathBuf> {
    download_with(&reqwest::Client::new(), url, path.as_ref()).await
}

impl GenerationResult {
    /// Downloads this result's image into `path`.
    pub async fn download(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        download_image(&self.url, path).await
    }
}

async fn download_with(client: &reqwest::Client, url: &str, path: &Path) -> Result<PathBuf> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ImageGenError::InvalidRequest(format!(
            "cannot download {url}: only http(s) URLs are supported"
        )));
    }

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ImageGenError::Api {
            status: status.as_u16(),
            message: "Failed to download image".into(),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Stream into a sibling file and rename it into place, so a failed
    // transfer never leaves a truncated image at `path`.
    let partial = partial_path(path);
    let written = match write_stream(response, &partial).await {
        Ok(written) => written,
        Err(err) => {
            discard(&partial).await;
            return Err(err);
        }
    };
    if let Err(err) = tokio::fs::rename(&partial, path).await {
        discard(&partial).await;
        return Err(err.into());
    }

    tracing::debug!(path = %path.display(), bytes = written, "saved image");
    Ok(path.to_path_buf())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

async fn write_stream(response: reqwest::Response, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        written += chunk.len() as u64;
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    Ok(written)
}

async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Err(err) if err.kind() != std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), error = %err, "could not remove partial download");
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ProviderKind;
    use httpmock::{Method::GET, MockServer};

    #[tokio::test]
    async fn test_download_writes_file() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/img/cat.png");
                then.status(200)
                    .header("content-type", "image/png")
                    .body([0x89u8, b'P', b'N', b'G', 1, 2, 3]);
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("cat.png");
        let result = GenerationResult::new(server.url("/img/cat.png"), ProviderKind::OpenAI);

        let saved = result.download(&dest).await.unwrap();
        mock.assert_async().await;

        assert_eq!(saved, dest);
        assert_eq!(
            std::fs::read(&dest).unwrap(),
            vec![0x89u8, b'P', b'N', b'G', 1, 2, 3]
        );
        assert!(!dir.path().join("nested").join("cat.png.part").exists());
    }

    #[test]
    fn test_partial_path_is_sibling() {
        assert_eq!(
            partial_path(Path::new("out/cat.png")),
            PathBuf::from("out/cat.png.part")
        );
    }

    #[tokio::test]
    async fn test_failed_save_leaves_no_partial_file() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/cat.png");
                then.status(200).body([1u8, 2, 3]);
            })
            .await;

        // A non-empty directory at the destination makes the final rename fail.
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("cat.png");
        std::fs::create_dir(&dest).unwrap();
        std::fs::write(dest.join("keep"), b"x").unwrap();

        let err = download_image(&server.url("/cat.png"), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, ImageGenError::Io(_)));
        assert!(dest.is_dir());
        assert!(!dir.path().join("cat.png.part").exists());
    }

    #[tokio::test]
    async fn test_download_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gone.png");
                then.status(410);
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = download_image(&server.url("/gone.png"), dir.path().join("gone.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, ImageGenError::Api { status: 410, .. }));
        assert!(!dir.path().join("gone.png").exists());
    }

    #[tokio::test]
    async fn test_download_rejects_storage_uri() {
        let dir = tempfile::tempdir().unwrap();
        let err = download_image("gs://bucket/img.png", dir.path().join("img.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ImageGenError::InvalidRequest(_)));
    }
}
