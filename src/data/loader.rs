use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use ndarray::{ArrayD, IxDyn};
use serde::Deserialize;

use crate::viewer::layers::ImageLayer;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an image layer from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – `{ "name": "...", "shape": [...], "data": [...] }`, row-major
/// * `.png`  – a single grayscale plane (2-D, viewable but not drillable)
pub fn load_file(path: &Path) -> Result<ImageLayer> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => load_json(path),
        "png" => load_png(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Stack same-sized PNGs, in the given order, into a `(n, height, width)`
/// volume.
pub fn load_png_stack(paths: &[impl AsRef<Path>]) -> Result<ImageLayer> {
    let first = paths.first().context("PNG stack needs at least one file")?;
    let name = format!("{}_stack", file_stem(first.as_ref()));

    let mut size = None;
    let mut data = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let (width, height, pixels) = read_gray(path)?;
        match size {
            None => size = Some((width, height)),
            Some(expected) => {
                ensure!(
                    expected == (width, height),
                    "{} is {width}x{height} but the stack is {}x{}",
                    path.display(),
                    expected.0,
                    expected.1
                );
            }
        }
        data.extend(pixels);
    }

    let (width, height) = size.context("PNG stack is empty")?;
    let shape = [paths.len(), height as usize, width as usize];
    let array = ArrayD::from_shape_vec(IxDyn(&shape), data).context("building PNG stack")?;
    Ok(ImageLayer::new(name, array))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema:
///
/// ```json
/// {
///   "name": "cells",
///   "shape": [5, 10, 64, 64],
///   "data": [0.0, 0.1, ...]
/// }
/// ```
///
/// `name` is optional and defaults to the file stem.
#[derive(Debug, Deserialize)]
struct VolumeFile {
    name: Option<String>,
    shape: Vec<usize>,
    data: Vec<f64>,
}

fn load_json(path: &Path) -> Result<ImageLayer> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let volume: VolumeFile = serde_json::from_str(&text).context("parsing JSON")?;

    let expected: usize = volume.shape.iter().product();
    ensure!(
        expected == volume.data.len(),
        "shape {:?} needs {expected} values but the file has {}",
        volume.shape,
        volume.data.len()
    );
    let array = ArrayD::from_shape_vec(IxDyn(&volume.shape), volume.data)
        .context("building image array")?;

    let name = volume.name.unwrap_or_else(|| file_stem(path));
    Ok(ImageLayer::new(name, array))
}

// ---------------------------------------------------------------------------
// PNG loader
// ---------------------------------------------------------------------------

fn load_png(path: &Path) -> Result<ImageLayer> {
    let (width, height, pixels) = read_gray(path)?;
    let array = ArrayD::from_shape_vec(IxDyn(&[height as usize, width as usize]), pixels)
        .context("building image array")?;
    Ok(ImageLayer::new(file_stem(path), array))
}

/// Decode as grayscale in `0.0..=1.0`, row-major.
fn read_gray(path: &Path) -> Result<(u32, u32, Vec<f64>)> {
    let img = image::open(path)
        .with_context(|| format!("decoding {}", path.display()))?
        .to_luma32f();
    let (width, height) = img.dimensions();
    let pixels = img.into_raw().into_iter().map(f64::from).collect();
    Ok((width, height, pixels))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn json_volume_round_trips_shape_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cells.json");
        std::fs::write(
            &path,
            r#"{ "shape": [2, 1, 3], "data": [0, 1, 2, 3, 4, 5] }"#,
        )
        .unwrap();

        let layer = load_file(&path).unwrap();
        assert_eq!(layer.name, "cells");
        assert_eq!(layer.shape(), &[2, 1, 3]);
        assert_eq!(layer.data()[IxDyn(&[1, 0, 2])], 5.0);
    }

    #[test]
    fn json_name_overrides_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.json");
        std::fs::write(&path, r#"{ "name": "nuclei", "shape": [1, 1, 1], "data": [7] }"#)
            .unwrap();
        assert_eq!(load_file(&path).unwrap().name, "nuclei");
    }

    #[test]
    fn json_shape_mismatch_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{ "shape": [2, 2, 2], "data": [1, 2, 3] }"#).unwrap();
        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("needs 8 values"));
    }

    #[test]
    fn unknown_extension_is_an_error() {
        assert!(load_file(Path::new("volume.tiff")).is_err());
    }

    #[test]
    fn png_stack_builds_a_volume() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for i in 0..3u8 {
            let path = dir.path().join(format!("frame_{i}.png"));
            GrayImage::from_fn(4, 2, |x, _| Luma([i * 50 + x as u8]))
                .save(&path)
                .unwrap();
            paths.push(path);
        }

        let layer = load_png_stack(&paths).unwrap();
        assert_eq!(layer.name, "frame_0_stack");
        assert_eq!(layer.shape(), &[3, 2, 4]);
        let v = layer.data()[IxDyn(&[2, 1, 3])];
        assert!((v - 103.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn png_stack_rejects_mixed_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        GrayImage::new(4, 4).save(&a).unwrap();
        GrayImage::new(2, 4).save(&b).unwrap();
        assert!(load_png_stack(&[a, b]).is_err());
    }
}
