use anyhow::{Context, Result};
use serde::Serialize;

/// Same layout the JSON loader expects.
#[derive(Serialize)]
struct VolumeFile {
    name: String,
    shape: Vec<usize>,
    data: Vec<f64>,
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Seeded noise source (splitmix64), so every run writes the same volume.
struct Noise(u64);

impl Noise {
    fn uniform(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        ((z ^ (z >> 31)) >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Zero-mean normal sample (Box-Muller).
    fn normal(&mut self, std_dev: f64) -> f64 {
        let u1 = self.uniform().max(1e-15);
        let u2 = self.uniform();
        std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

/// A few blobs whose brightness peaks at different depths and drifts over
/// time, so drilling different spots gives visibly different curves.
fn main() -> Result<()> {
    let mut noise = Noise(42);

    let (nt, nz, ny, nx) = (5usize, 30usize, 64usize, 64usize);
    // (row, col, radius, peak depth, depth width, amplitude)
    let blobs = [
        (16.0, 20.0, 6.0, 8.0, 3.0, 1.0),
        (40.0, 44.0, 9.0, 18.0, 5.0, 0.7),
        (48.0, 14.0, 5.0, 24.0, 2.0, 1.3),
    ];

    let mut data = Vec::with_capacity(nt * nz * ny * nx);
    for t in 0..nt {
        let drift = t as f64 * 1.5;
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let signal: f64 = blobs
                        .iter()
                        .map(|&(row, col, radius, depth, width, amp)| {
                            let dist = (y as f64 - row).hypot(x as f64 - col);
                            gaussian(dist, 0.0, radius, 1.0)
                                * gaussian(z as f64, depth + drift, width, amp)
                        })
                        .sum();
                    data.push(signal + noise.normal(0.02));
                }
            }
        }
    }

    let volume = VolumeFile {
        name: "sample".to_string(),
        shape: vec![nt, nz, ny, nx],
        data,
    };

    let output_path = "sample_volume.json";
    let file = std::fs::File::create(output_path).context("creating output file")?;
    serde_json::to_writer(std::io::BufWriter::new(file), &volume).context("writing volume")?;

    println!("Wrote a {nt}x{nz}x{ny}x{nx} sample volume to {output_path}");
    Ok(())
}
