//! Icon family rasterization, routes and head links
//!
//! One vector source is rendered to a fixed family of PNGs. The ICO sizes
//! are packed into `favicon.ico`, and the renditions only the ICO needs are
//! removed afterwards. The 57px Apple icons are not routed under their own
//! names; they answer the legacy `apple-touch-icon.png` and
//! `apple-touch-icon-precomposed.png` requests instead.

use super::head::link;
use crate::error::{IoResultExt, Result};
use crate::manifest::Route;
use crate::runtime::{IconPacker, Rasterizer};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ICO_SIZES: [u32; 7] = [16, 24, 32, 48, 64, 128, 256];
pub const FAVICON_SIZES: [u32; 6] = [16, 32, 96, 160, 196, 300];
pub const ANDROID_SIZES: [u32; 1] = [192];
pub const APPLE_SIZES: [u32; 5] = [57, 76, 120, 152, 180];

/// Apple size served under the un-sized legacy names
const LEGACY_APPLE_SIZE: u32 = 57;

pub const ICO_FILE: &str = "favicon.ico";

/// Largest PNG favicon, reused as the social preview image
pub const PREVIEW_SIZE: u32 = 300;

pub fn favicon_file(size: u32) -> String {
    format!("favicon-{0}x{0}.png", size)
}

pub fn android_file(size: u32) -> String {
    format!("touch-icon-{0}x{0}.png", size)
}

pub fn apple_file(size: u32) -> String {
    format!("apple-touch-icon-{0}x{0}.png", size)
}

pub fn apple_precomposed_file(size: u32) -> String {
    format!("apple-touch-icon-{0}x{0}-precomposed.png", size)
}

/// Preview image file name for open-graph tags
pub fn preview_file() -> String {
    favicon_file(PREVIEW_SIZE)
}

/// Routes and head links of a generated icon family
#[derive(Debug, Clone, Default)]
pub struct IconFamily {
    pub routes: Vec<Route>,
    pub head: String,
}

/// Sizes rendered only to be packed into the ICO
fn ico_only_sizes() -> impl Iterator<Item = u32> {
    ICO_SIZES
        .into_iter()
        .filter(|size| !FAVICON_SIZES.contains(size))
}

/// Render the icon family from `source` into `favicon_dir`
///
/// `root` is the serving root recorded in the routes. With `reuse`, files
/// already present are kept; an existing `favicon.ico` also skips the
/// ICO-only renditions and the packing step.
pub fn generate(
    source: &Path,
    favicon_dir: &Path,
    root: &str,
    reuse: bool,
    rasterizer: &dyn Rasterizer,
    packer: &dyn IconPacker,
) -> Result<IconFamily> {
    std::fs::create_dir_all(favicon_dir).at(favicon_dir)?;

    let ico_path = favicon_dir.join(ICO_FILE);
    let pack_ico = !(reuse && ico_path.is_file());

    let mut png_sizes: BTreeSet<u32> = FAVICON_SIZES.into_iter().collect();
    if pack_ico {
        png_sizes.extend(ICO_SIZES);
    }

    let mut outputs: Vec<(String, u32)> = png_sizes
        .into_iter()
        .map(|size| (favicon_file(size), size))
        .collect();
    outputs.extend(ANDROID_SIZES.map(|size| (android_file(size), size)));
    for size in APPLE_SIZES {
        outputs.push((apple_file(size), size));
        outputs.push((apple_precomposed_file(size), size));
    }

    for (file, size) in &outputs {
        let output = favicon_dir.join(file);
        if reuse && output.is_file() {
            debug!(file = %file, "keeping existing icon");
            continue;
        }
        rasterizer.rasterize(source, &output, *size, *size)?;
        debug!(file = %file, size, "rasterized");
    }

    if pack_ico {
        let pngs: Vec<PathBuf> = ICO_SIZES
            .iter()
            .map(|&size| favicon_dir.join(favicon_file(size)))
            .collect();
        packer.pack(&pngs, &ico_path)?;
        for size in ico_only_sizes() {
            let path = favicon_dir.join(favicon_file(size));
            std::fs::remove_file(&path).at(&path)?;
        }
        debug!(file = %ico_path.display(), "packed");
    }

    Ok(IconFamily {
        routes: routes(root),
        head: head(),
    })
}

/// Routes for the generated family, in serving order
pub fn routes(root: &str) -> Vec<Route> {
    let mut routes: Vec<Route> = FAVICON_SIZES
        .iter()
        .map(|&size| favicon_file(size))
        .chain(ANDROID_SIZES.iter().map(|&size| android_file(size)))
        .chain(
            APPLE_SIZES
                .iter()
                .filter(|&&size| size != LEGACY_APPLE_SIZE)
                .map(|&size| apple_file(size)),
        )
        .chain(
            APPLE_SIZES
                .iter()
                .filter(|&&size| size != LEGACY_APPLE_SIZE)
                .map(|&size| apple_precomposed_file(size)),
        )
        .map(|file| Route::static_asset(&file, root))
        .collect();

    routes.push(Route::static_file(
        "apple-touch-icon.png",
        &apple_file(LEGACY_APPLE_SIZE),
        root,
    ));
    routes.push(Route::static_file(
        "apple-touch-icon-precomposed.png",
        &apple_precomposed_file(LEGACY_APPLE_SIZE),
        root,
    ));
    routes.push(Route::static_asset(ICO_FILE, root));
    routes
}

/// Head links for the generated family
pub fn head() -> String {
    let mut lines = vec![link(&format!("rel=\"shortcut icon\" href=\"/{}\"", ICO_FILE))];

    let sized_png = |file: String, size: u32| {
        link(&format!(
            "rel=\"icon\" type=\"image/png\" href=\"/{}\" sizes=\"{1}x{1}\"",
            file, size
        ))
    };
    lines.extend(FAVICON_SIZES.map(|size| sized_png(favicon_file(size), size)));
    lines.extend(ANDROID_SIZES.map(|size| sized_png(android_file(size), size)));

    // largest first
    for size in APPLE_SIZES.into_iter().rev() {
        let href = if size == LEGACY_APPLE_SIZE {
            "apple-touch-icon.png".to_string()
        } else {
            apple_file(size)
        };
        lines.push(link(&format!(
            "rel=\"apple-touch-icon\" sizes=\"{0}x{0}\" href=\"/{1}\"",
            size, href
        )));
    }

    lines.join("\n")
}
