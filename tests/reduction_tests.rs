//! Integration tests for the 2D mapping pipeline.
//!
//! These tests drive the full path from high-dimensional embeddings
//! through dimensionality reduction to pinned graph nodes.

use fontscape::reduce::reduce_to_2d;
use fontscape::{Embedding, FontCatalog, FontScape, Pca, Reduction, ServiceConfig, Tsne};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn embedding(data: &[f32]) -> Embedding {
    Embedding::new(data.to_vec()).unwrap()
}

/// Two well-separated clusters of 8D points.
fn clustered_embeddings(per_cluster: usize) -> Vec<Embedding> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut out = Vec::with_capacity(per_cluster * 2);
    for center in [0.0f32, 10.0] {
        for _ in 0..per_cluster {
            let data: Vec<f32> = (0..8).map(|_| center + rng.gen_range(-0.5..0.5)).collect();
            out.push(Embedding::new(data).unwrap());
        }
    }
    out
}

fn mean_pairwise_distance(points: &[[f32; 2]]) -> f32 {
    let mut total = 0.0;
    let mut count = 0;
    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            let dx = points[i][0] - points[j][0];
            let dy = points[i][1] - points[j][1];
            total += (dx * dx + dy * dy).sqrt();
            count += 1;
        }
    }
    total / count as f32
}

/// PCA keeps well-separated clusters apart in the projection.
#[test]
fn test_pca_separates_clusters() {
    let embeddings = clustered_embeddings(10);
    let coords = reduce_to_2d(&embeddings, Reduction::Pca).unwrap();
    assert_eq!(coords.len(), 20);

    let first = &coords[..10];
    let second = &coords[10..];
    let intra = mean_pairwise_distance(first).max(mean_pairwise_distance(second));

    let centroid = |pts: &[[f32; 2]]| {
        let n = pts.len() as f32;
        [
            pts.iter().map(|p| p[0]).sum::<f32>() / n,
            pts.iter().map(|p| p[1]).sum::<f32>() / n,
        ]
    };
    let (c1, c2) = (centroid(first), centroid(second));
    let inter = ((c1[0] - c2[0]).powi(2) + (c1[1] - c2[1]).powi(2)).sqrt();

    assert!(
        inter > intra * 2.0,
        "clusters not separated: inter {} intra {}",
        inter,
        intra
    );
}

/// PCA reconstruction through inverse_transform stays close to the input
/// when the data is intrinsically low-dimensional.
#[test]
fn test_pca_inverse_transform_reconstructs() {
    // Points on a plane embedded in 5D.
    let mut rng = StdRng::seed_from_u64(3);
    let embeddings: Vec<Embedding> = (0..30)
        .map(|_| {
            let a: f32 = rng.gen_range(-1.0..1.0);
            let b: f32 = rng.gen_range(-1.0..1.0);
            embedding(&[a, b, a + b, a - b, 2.0 * a])
        })
        .collect();

    let pca = Pca::fit(&embeddings, 2).unwrap();
    for original in embeddings.iter().take(5) {
        let projected = pca.transform(original);
        let restored = pca.inverse_transform(&projected).unwrap();
        for (x, y) in original.as_slice().iter().zip(restored.as_slice()) {
            assert!((x - y).abs() < 1e-3, "reconstruction drifted: {} vs {}", x, y);
        }
    }
}

/// t-SNE is deterministic for a fixed seed.
#[test]
fn test_tsne_is_deterministic() {
    let embeddings = clustered_embeddings(6);
    let tsne = Tsne::default().iterations(100);

    let a = tsne.fit_transform(&embeddings).unwrap();
    let b = tsne.fit_transform(&embeddings).unwrap();
    assert_eq!(a, b);
}

/// t-SNE keeps cluster members closer to each other than to the other
/// cluster.
#[test]
fn test_tsne_separates_clusters() {
    let embeddings = clustered_embeddings(8);
    let coords = Tsne::default()
        .perplexity(5.0)
        .fit_transform(&embeddings)
        .unwrap();

    let intra =
        mean_pairwise_distance(&coords[..8]).max(mean_pairwise_distance(&coords[8..]));
    let cross: f32 = {
        let mut total = 0.0;
        for a in &coords[..8] {
            for b in &coords[8..] {
                total += ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt();
            }
        }
        total / 64.0
    };
    assert!(cross > intra, "cross {} intra {}", cross, intra);
}

/// The service map operation produces one pinned node per font, scaled to
/// the requested canvas extent.
#[test]
fn test_map_produces_pinned_nodes_within_extent() {
    let pairs: Vec<(String, Embedding)> = clustered_embeddings(5)
        .into_iter()
        .enumerate()
        .map(|(i, e)| (format!("Font{:02}", i), e))
        .collect();
    let catalog = FontCatalog::from_pairs(pairs).unwrap();
    let service = FontScape::build(catalog, ServiceConfig::default()).unwrap();

    let nodes = service.map(None, Reduction::Pca, Some(250.0)).unwrap();
    assert_eq!(nodes.len(), 10);

    let mut max_abs = 0.0f32;
    for node in &nodes {
        assert_eq!(node.shape, "circularImage");
        assert!(node.fixed.x && node.fixed.y);
        assert!(node.image.ends_with(&format!("{}_Aa.png", node.label)));
        max_abs = max_abs.max(node.x.abs()).max(node.y.abs());
    }
    // The widest coordinate lands exactly on the extent.
    assert!((max_abs - 250.0).abs() < 1e-2);
}

/// Too few samples for a meaningful embedding is an error, not a panic.
#[test]
fn test_tsne_rejects_tiny_input() {
    let embeddings = vec![embedding(&[1.0, 0.0]), embedding(&[0.0, 1.0])];
    assert!(Tsne::default().fit_transform(&embeddings).is_err());
}
