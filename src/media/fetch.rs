/// Asset fetching and optimization
///
/// Reads an asset from disk or over HTTP(S), decodes it, downsizes it to the
/// width implied by the sizes hint, and re-encodes it at the quality hint:
/// JPEG for opaque images, PNG when there is an alpha channel. Optimized
/// bytes are cached on disk when a cache directory is given.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use iced::widget::image::Handle;
use log::{debug, info, warn};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::UNIX_EPOCH;

use super::sizes::SizesHint;
use crate::error::FetchError;
use crate::state::load::{FetchRequest, LoadedAsset};

/// Distinguishes temp files of concurrent cache writes
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Where an asset lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Local(PathBuf),
    Remote(String),
}

impl AssetSource {
    pub fn parse(source: &str) -> Self {
        let source = source.trim();
        if source.starts_with("http://") || source.starts_with("https://") {
            AssetSource::Remote(source.to_string())
        } else {
            let path = source.strip_prefix("file://").unwrap_or(source);
            AssetSource::Local(PathBuf::from(path))
        }
    }

    /// Changes whenever a local file is replaced; remote sources have no version
    async fn version(&self) -> u32 {
        let AssetSource::Local(path) = self else {
            return 0;
        };
        let Ok(metadata) = tokio::fs::metadata(path).await else {
            return 0;
        };

        let modified = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |since| since.as_nanos());

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&metadata.len().to_le_bytes());
        hasher.update(&modified.to_le_bytes());
        hasher.finalize()
    }
}

/// Encoding of an optimized asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    /// Keeps transparency
    Png,
}

impl OutputFormat {
    const ALL: [OutputFormat; 2] = [OutputFormat::Jpeg, OutputFormat::Png];

    fn for_image(image: &DynamicImage) -> Self {
        if image.color().has_alpha() {
            OutputFormat::Png
        } else {
            OutputFormat::Jpeg
        }
    }

    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Context of a fetch that is not part of the request itself
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Viewport width used to resolve the sizes hint; 0 disables downsizing
    pub viewport_width: f32,
    /// Optimizer cache directory
    pub cache_dir: Option<PathBuf>,
}

/// Fetch, decode and optimize the asset named by `request`
pub async fn fetch(request: FetchRequest, options: FetchOptions) -> Result<LoadedAsset, FetchError> {
    let source = AssetSource::parse(&request.source);
    let target_width = target_width(&request.sizes, options.viewport_width);

    let cache = match options.cache_dir {
        Some(dir) => {
            let version = source.version().await;
            Some(CacheEntry::new(dir, &request.source, version, target_width, request.quality))
        }
        None => None,
    };

    if let Some(entry) = &cache {
        if let Some(asset) = entry.lookup().await {
            return Ok(asset);
        }
    }

    let bytes = read_source(&source).await?;
    let quality = request.quality;

    let optimized = tokio::task::spawn_blocking(move || optimize(&bytes, target_width, quality)).await??;

    if let Some(entry) = &cache {
        entry.store(&optimized).await;
    }

    Ok(optimized.asset)
}

/// Width in pixels the asset is downsized to, or None to keep its width
fn target_width(sizes: &str, viewport_width: f32) -> Option<u32> {
    if viewport_width <= 0.0 {
        return None;
    }
    let width = SizesHint::parse(sizes).resolve(viewport_width).ceil();
    (width >= 1.0).then_some(width as u32)
}

async fn read_source(source: &AssetSource) -> Result<Vec<u8>, FetchError> {
    match source {
        AssetSource::Local(path) => tokio::fs::read(path).await.map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                FetchError::NotFound(path.display().to_string())
            } else {
                FetchError::Io {
                    path: path.display().to_string(),
                    message: err.to_string(),
                }
            }
        }),
        AssetSource::Remote(url) => {
            let response = reqwest::get(url).await?.error_for_status()?;
            let bytes = response.bytes().await?;
            Ok(bytes.to_vec())
        }
    }
}

/// Output of [`optimize`]
struct Optimized {
    asset: LoadedAsset,
    encoded: Vec<u8>,
    format: OutputFormat,
}

/// Decode, downsize and re-encode
fn optimize(bytes: &[u8], target_width: Option<u32>, quality: u8) -> Result<Optimized, FetchError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| FetchError::Decode(e.to_string()))?;

    let resized = match target_width {
        Some(width) if decoded.width() > width => decoded.resize(width, u32::MAX, FilterType::Lanczos3),
        _ => decoded,
    };

    let format = OutputFormat::for_image(&resized);
    let encoded = match format {
        OutputFormat::Jpeg => encode_jpeg(&resized, quality)?,
        OutputFormat::Png => encode_png(&resized)?,
    };

    Ok(Optimized {
        asset: LoadedAsset {
            width: resized.width(),
            height: resized.height(),
            handle: Handle::from_bytes(encoded.clone()),
        },
        encoded,
        format,
    })
}

fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, FetchError> {
    let rgb = image.to_rgb8();
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| FetchError::Encode(e.to_string()))?;
    Ok(encoded)
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, FetchError> {
    let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
    let mut encoded = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
        .map_err(|e| FetchError::Encode(e.to_string()))?;
    Ok(encoded)
}

fn asset_from_encoded(bytes: Vec<u8>) -> Result<LoadedAsset, FetchError> {
    let decoded = image::load_from_memory(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(LoadedAsset {
        width: decoded.width(),
        height: decoded.height(),
        handle: Handle::from_bytes(bytes),
    })
}

/// Optimizer cache files of one source version at one width and quality
///
/// Names are `<source>-<version>-w<width>-q<quality>.<ext>`; the source part
/// groups every entry of one asset so stale ones can be pruned.
#[derive(Debug, Clone)]
struct CacheEntry {
    dir: PathBuf,
    prefix: String,
    stem: String,
}

impl CacheEntry {
    fn new(dir: PathBuf, source: &str, version: u32, width: Option<u32>, quality: u8) -> Self {
        let prefix = format!("{:08x}-", crc32fast::hash(source.as_bytes()));
        let width = width.map_or_else(|| "orig".to_string(), |w| w.to_string());
        let stem = format!("{}{:08x}-w{}-q{}", prefix, version, width, quality);
        Self { dir, prefix, stem }
    }

    fn path(&self, format: OutputFormat) -> PathBuf {
        self.dir.join(format!("{}.{}", self.stem, format.extension()))
    }

    /// Decode a cached copy; unreadable entries are removed
    async fn lookup(&self) -> Option<LoadedAsset> {
        for format in OutputFormat::ALL {
            let path = self.path(format);
            let Ok(bytes) = tokio::fs::read(&path).await else {
                continue;
            };

            let decoded = tokio::task::spawn_blocking(move || asset_from_encoded(bytes))
                .await
                .map_err(FetchError::from)
                .and_then(|result| result);

            match decoded {
                Ok(asset) => {
                    debug!("Optimizer cache hit: {}", path.display());
                    return Some(asset);
                }
                Err(err) => {
                    warn!("⚠️  Discarding broken cache entry {}: {}", path.display(), err);
                    if let Err(err) = tokio::fs::remove_file(&path).await {
                        warn!("⚠️  Failed to remove {}: {}", path.display(), err);
                    }
                }
            }
        }
        None
    }

    /// Best effort: a failed cache write only costs a re-encode next time
    async fn store(&self, optimized: &Optimized) {
        if let Err(err) = tokio::fs::create_dir_all(&self.dir).await {
            warn!("⚠️  Failed to create optimizer cache {}: {}", self.dir.display(), err);
            return;
        }

        // Atomic write: readers never see a partial file
        let path = self.path(optimized.format);
        let temp = self.dir.join(format!(
            "{}.{}-{}.tmp",
            self.stem,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(err) = tokio::fs::write(&temp, &optimized.encoded).await {
            warn!("⚠️  Failed to write {}: {}", temp.display(), err);
            let _ = tokio::fs::remove_file(&temp).await;
            return;
        }
        if let Err(err) = tokio::fs::rename(&temp, &path).await {
            warn!("⚠️  Failed to move {} into place: {}", path.display(), err);
            let _ = tokio::fs::remove_file(&temp).await;
            return;
        }

        info!("📸 Cached optimized image: {}", path.display());
        self.prune(&path).await;
    }

    /// Remove other widths, qualities and versions of the same source
    async fn prune(&self, keep: &Path) {
        let Ok(mut entries) = tokio::fs::read_dir(&self.dir).await else {
            return;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if path == keep || !name.starts_with(&self.prefix) || name.ends_with(".tmp") {
                continue;
            }

            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!("Pruned stale cache entry {}", path.display()),
                Err(err) => warn!("⚠️  Failed to prune {}: {}", path.display(), err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::load::{InstanceId, DEFAULT_SIZES};
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn request(source: &str) -> FetchRequest {
        FetchRequest {
            instance: InstanceId(1),
            source: source.to_string(),
            quality: 80,
            sizes: DEFAULT_SIZES.to_string(),
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("folio-gallery-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        let image = RgbImage::from_pixel(width, height, Rgb([200, 120, 40]));
        std::fs::write(path, png_bytes(DynamicImage::ImageRgb8(image))).unwrap();
    }

    fn cached_options(cache_dir: &Path) -> FetchOptions {
        FetchOptions {
            viewport_width: 1000.0,
            cache_dir: Some(cache_dir.to_path_buf()),
        }
    }

    /// Cache entry `fetch` uses for `source` under `cached_options`
    async fn entry_for(cache_dir: &Path, source: &Path) -> CacheEntry {
        let name = source.to_str().unwrap();
        let version = AssetSource::parse(name).version().await;
        CacheEntry::new(cache_dir.to_path_buf(), name, version, Some(500), 80)
    }

    fn cache_files(cache_dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(cache_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }

    #[test]
    fn test_source_kinds() {
        assert_eq!(
            AssetSource::parse("https://cdn.example.com/a.jpg"),
            AssetSource::Remote("https://cdn.example.com/a.jpg".into())
        );
        assert_eq!(
            AssetSource::parse("file:///srv/img/a.jpg"),
            AssetSource::Local(PathBuf::from("/srv/img/a.jpg"))
        );
        assert_eq!(AssetSource::parse("img/a.jpg"), AssetSource::Local(PathBuf::from("img/a.jpg")));
    }

    #[test]
    fn test_target_width() {
        assert_eq!(target_width(DEFAULT_SIZES, 0.0), None);
        assert_eq!(target_width(DEFAULT_SIZES, 1000.0), Some(500));
        assert_eq!(target_width("100vw", 640.0), Some(640));
    }

    #[test]
    fn test_cache_names_vary_with_every_input() {
        let dir = PathBuf::from("/cache");
        let entry = |source: &str, version: u32, width: u32, quality: u8| {
            CacheEntry::new(dir.clone(), source, version, Some(width), quality).path(OutputFormat::Jpeg)
        };

        let a = entry("a.jpg", 1, 500, 88);
        assert_eq!(a, entry("a.jpg", 1, 500, 88));
        assert_ne!(a, entry("a.jpg", 2, 500, 88));
        assert_ne!(a, entry("a.jpg", 1, 640, 88));
        assert_ne!(a, entry("a.jpg", 1, 500, 70));
        assert_ne!(a, entry("b.jpg", 1, 500, 88));

        let png = CacheEntry::new(dir.clone(), "a.jpg", 1, Some(500), 88).path(OutputFormat::Png);
        assert_ne!(a, png);
        assert_eq!(png.extension().unwrap(), "png");
    }

    #[test]
    fn test_opaque_images_become_jpeg() {
        let source = png_bytes(DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]))));
        let optimized = optimize(&source, None, 80).unwrap();

        assert_eq!(optimized.format, OutputFormat::Jpeg);
        assert_eq!(&optimized.encoded[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_transparency_survives_optimization() {
        let logo = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]));
        let source = png_bytes(DynamicImage::ImageRgba8(logo));

        let optimized = optimize(&source, None, 80).unwrap();
        assert_eq!(optimized.format, OutputFormat::Png);

        let decoded = image::load_from_memory(&optimized.encoded).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(3, 3)[3], 0);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let result = fetch(request("/nonexistent/path.jpg"), FetchOptions::default()).await;
        assert!(matches!(result, Err(FetchError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_garbage_is_a_decode_error() {
        let dir = temp_dir("garbage");
        let path = dir.join("broken.jpg");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let result = fetch(request(path.to_str().unwrap()), FetchOptions::default()).await;
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_downsizes_to_sizes_hint() {
        let dir = temp_dir("downsize");
        let path = dir.join("wide.png");
        write_png(&path, 1200, 600);

        let options = FetchOptions {
            viewport_width: 1000.0,
            cache_dir: None,
        };
        let asset = fetch(request(path.to_str().unwrap()), options).await.unwrap();

        assert_eq!((asset.width, asset.height), (500, 250));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_the_source() {
        let dir = temp_dir("cache-hit");
        let path = dir.join("small.png");
        write_png(&path, 64, 48);
        let cache_dir = dir.join("optimized");

        let asset = fetch(request(path.to_str().unwrap()), cached_options(&cache_dir)).await.unwrap();
        assert_eq!((asset.width, asset.height), (64, 48));

        let cached = entry_for(&cache_dir, &path).await.path(OutputFormat::Jpeg);
        assert!(cached.exists());

        // A different image planted under the same key is what comes back
        let planted = optimize(&png_bytes(DynamicImage::new_rgb8(10, 10)), None, 80).unwrap();
        std::fs::write(&cached, &planted.encoded).unwrap();

        let again = fetch(request(path.to_str().unwrap()), cached_options(&cache_dir)).await.unwrap();
        assert_eq!((again.width, again.height), (10, 10));
    }

    #[tokio::test]
    async fn test_truncated_cache_entry_falls_back_to_source() {
        let dir = temp_dir("cache-truncated");
        let path = dir.join("small.png");
        write_png(&path, 64, 48);
        let cache_dir = dir.join("optimized");
        std::fs::create_dir_all(&cache_dir).unwrap();

        let cached = entry_for(&cache_dir, &path).await.path(OutputFormat::Jpeg);
        std::fs::write(&cached, [0xFF, 0xD8, 0xFF]).unwrap();

        let asset = fetch(request(path.to_str().unwrap()), cached_options(&cache_dir)).await.unwrap();
        assert_eq!((asset.width, asset.height), (64, 48));

        // Rewritten with a decodable copy, no temp files left behind
        let bytes = std::fs::read(&cached).unwrap();
        assert_eq!(image::load_from_memory(&bytes).unwrap().width(), 64);
        assert!(cache_files(&cache_dir)
            .iter()
            .all(|file| file.extension().unwrap() != "tmp"));
    }

    #[tokio::test]
    async fn test_replaced_file_is_fetched_again() {
        let dir = temp_dir("cache-replaced");
        let path = dir.join("logo.png");
        write_png(&path, 64, 48);
        let cache_dir = dir.join("optimized");

        let first = fetch(request(path.to_str().unwrap()), cached_options(&cache_dir)).await.unwrap();
        assert_eq!((first.width, first.height), (64, 48));

        let noisy = RgbImage::from_fn(200, 100, |x, y| Rgb([(x * 7 + y * 13) as u8, (x * y) as u8, (y * 3) as u8]));
        std::fs::write(&path, png_bytes(DynamicImage::ImageRgb8(noisy))).unwrap();

        let second = fetch(request(path.to_str().unwrap()), cached_options(&cache_dir)).await.unwrap();
        assert_eq!((second.width, second.height), (200, 100));

        // The entry for the replaced file was pruned
        assert_eq!(cache_files(&cache_dir).len(), 1);
    }

    #[tokio::test]
    async fn test_new_width_prunes_old_entries_of_the_source() {
        let dir = temp_dir("cache-prune");
        let path = dir.join("wide.png");
        write_png(&path, 1200, 600);
        let other = dir.join("other.png");
        write_png(&other, 32, 32);
        let cache_dir = dir.join("optimized");

        fetch(request(other.to_str().unwrap()), cached_options(&cache_dir)).await.unwrap();
        fetch(request(path.to_str().unwrap()), cached_options(&cache_dir)).await.unwrap();
        assert_eq!(cache_files(&cache_dir).len(), 2);

        let narrow = FetchOptions {
            viewport_width: 900.0,
            cache_dir: Some(cache_dir.clone()),
        };
        let asset = fetch(request(path.to_str().unwrap()), narrow).await.unwrap();
        assert_eq!(asset.width, 450);

        // One entry per source: the 500px copy is gone, the other source is untouched
        assert_eq!(cache_files(&cache_dir).len(), 2);
        assert!(!entry_for(&cache_dir, &path).await.path(OutputFormat::Jpeg).exists());
        assert!(entry_for(&cache_dir, &other).await.path(OutputFormat::Jpeg).exists());
    }
}
