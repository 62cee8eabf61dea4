//! Loading of external files into GPU textures.
//!
//! Natively, files are read from [`Settings::asset_root`] relative to the working
//! directory (falling back to the copy the build script places in `OUT_DIR`).
//! On the web they are fetched from `<origin>/<asset_root>/<path>`.

use std::{cell::Cell, collections::HashMap};

use anyhow::*;
use anyhow::Context as _;

use crate::{
    context::Context,
    data_structures::texture::{ColorSpace, Texture},
    settings::Settings,
};

#[cfg(target_arch = "wasm32")]
fn format_url(settings: &Settings, file_name: &str) -> Result<reqwest::Url> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no browser window"))?;
    let origin = window
        .location()
        .origin()
        .map_err(|e| anyhow!("page origin unavailable: {e:?}"))?;
    let root = settings.asset_root.trim_matches('/');
    let base = if root.is_empty() {
        format!("{origin}/")
    } else {
        format!("{origin}/{root}/")
    };
    let base = reqwest::Url::parse(&base)?;
    Ok(base.join(file_name.trim_start_matches('/'))?)
}

#[cfg(not(target_arch = "wasm32"))]
fn asset_path(settings: &Settings, file_name: &str) -> std::path::PathBuf {
    let file_name = file_name.trim_start_matches('/');
    let path = std::path::Path::new(&settings.asset_root).join(file_name);
    if path.exists() {
        return path;
    }
    let bundled = std::path::Path::new(env!("OUT_DIR"))
        .join(&settings.asset_root)
        .join(file_name);
    if bundled.exists() { bundled } else { path }
}

pub async fn load_binary(settings: &Settings, file_name: &str) -> Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(settings, file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = asset_path(settings, file_name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?
    };

    Ok(data)
}

/// One texture file and how its texels are to be interpreted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureRequest {
    pub path: String,
    pub color_space: ColorSpace,
}

impl TextureRequest {
    pub fn new(path: impl Into<String>, color_space: ColorSpace) -> Self {
        Self {
            path: path.into(),
            color_space,
        }
    }
}

/// Successfully loaded textures keyed by the path they were requested with.
#[derive(Debug, Default)]
pub struct TextureSet {
    textures: HashMap<String, Texture>,
}

impl TextureSet {
    pub fn get(&self, path: &str) -> Option<&Texture> {
        self.textures.get(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, texture: Texture) {
        self.textures.insert(path.into(), texture);
    }

    pub fn contains(&self, path: &str) -> bool {
        self.textures.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Keep the first request per path.
pub fn dedup_requests(requests: &[TextureRequest]) -> Vec<TextureRequest> {
    let mut seen = std::collections::HashSet::new();
    requests
        .iter()
        .filter(|request| seen.insert(request.path.as_str()))
        .cloned()
        .collect()
}

async fn load_texture(ctx: &Context, request: &TextureRequest) -> Result<Texture> {
    let data = load_binary(&ctx.settings, &request.path).await?;
    Texture::from_bytes(&ctx.device, &ctx.queue, &data, &request.path, request.color_space)
}

/// Loads all requests concurrently.
///
/// Progress is logged per finished file. Files that cannot be read or decoded
/// are left out of the returned set; materials then bind their fallback maps.
pub async fn load_textures(ctx: &Context, requests: &[TextureRequest]) -> TextureSet {
    let requests = dedup_requests(requests);
    let total = requests.len();
    let done = Cell::new(0usize);

    let futures = requests.iter().map(|request| {
        let done = &done;
        async move {
            let result = load_texture(ctx, request).await;
            done.set(done.get() + 1);
            match &result {
                Result::Ok(_) => log::info!("loaded {}/{}: {}", done.get(), total, request.path),
                Err(e) => log::warn!("failed {}/{}: {}: {:#}", done.get(), total, request.path, e),
            }
            (request.path.clone(), result)
        }
    });

    let mut set = TextureSet::default();
    for (path, result) in futures::future::join_all(futures).await {
        if let Result::Ok(texture) = result {
            set.insert(path, texture);
        }
    }
    log::info!("{}/{} textures available", set.len(), total);
    set
}

/// Loads six faces in +X, -X, +Y, -Y, +Z, -Z order into one cube texture.
pub async fn load_cube_texture(ctx: &Context, faces: &[&str; 6]) -> Result<Texture> {
    let images = futures::future::try_join_all(faces.iter().map(|face| async move {
        let data = load_binary(&ctx.settings, face).await?;
        image::load_from_memory(&data).with_context(|| format!("decoding cube face {face}"))
    }))
    .await?;
    let images: [image::DynamicImage; 6] = images
        .try_into()
        .map_err(|v: Vec<_>| anyhow!("expected 6 cube faces, got {}", v.len()))?;
    let texture = Texture::cube_from_images(&ctx.device, &ctx.queue, &images, "environment map")?;
    log::info!("loaded environment map ({})", faces.join(", "));
    Ok(texture)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_paths_are_requested_once() {
        let requests = [
            TextureRequest::new("a.jpg", ColorSpace::Srgb),
            TextureRequest::new("b.jpg", ColorSpace::Linear),
            TextureRequest::new("a.jpg", ColorSpace::Linear),
        ];
        let unique = dedup_requests(&requests);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0], TextureRequest::new("a.jpg", ColorSpace::Srgb));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn missing_file_is_an_error() {
        let settings = Settings::default().with_asset_root("does-not-exist");
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let err = runtime.block_on(load_binary(&settings, "nope.png")).unwrap_err();
        assert!(format!("{err:#}").contains("nope.png"));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn leading_slash_is_relative_to_asset_root() {
        let settings = Settings::default().with_asset_root("some/root");
        let path = asset_path(&settings, "/rock/Rock028_1K_Color.jpg");
        assert!(path.ends_with("some/root/rock/Rock028_1K_Color.jpg"));
    }
}
