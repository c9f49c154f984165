//! Property checks for preprocessing and ranking.

use image::{ImageBuffer, Rgb};
use proptest::prelude::*;

use leafscan::pipeline::preprocessor::prepare;
use leafscan::pipeline::ranker::rank;
use leafscan::pipeline::CanonicalImage;
use leafscan::{ClassCatalog, ClassScores, TargetSize};

fn image_from(width: u32, height: u32, seed: u8) -> CanonicalImage {
    CanonicalImage::from_rgb(ImageBuffer::from_fn(width, height, |x, y| {
        let v = (x as u8).wrapping_mul(31) ^ (y as u8).wrapping_mul(17) ^ seed;
        Rgb([v, v.wrapping_add(85), v.wrapping_add(170)])
    }))
}

proptest! {
    #[test]
    fn prepared_tensor_is_in_unit_range(
        width in 1u32..48,
        height in 1u32..48,
        tw in 1u32..24,
        th in 1u32..24,
        seed in any::<u8>(),
    ) {
        let img = image_from(width, height, seed);
        let target = TargetSize::new(tw, th);

        let tensor = prepare(&img, target).unwrap();
        prop_assert_eq!(tensor.shape(), [1, th as usize, tw as usize, 3]);
        prop_assert!(tensor.as_slice().iter().all(|v| (0.0..=1.0).contains(v)));

        let again = prepare(&img, target).unwrap();
        prop_assert_eq!(tensor, again);
    }

    #[test]
    fn ranking_is_sorted_and_deterministic(scores in prop::collection::vec(0.0f64..1.0, 1..20)) {
        let catalog = ClassCatalog::new((0..scores.len()).map(|i| format!("class{}", i))).unwrap();
        let scores = ClassScores(scores);

        let first = rank(&scores, &catalog).unwrap();
        prop_assert_eq!(&first, &rank(&scores, &catalog).unwrap());
        prop_assert_eq!(first.ranked.len(), scores.len());
        prop_assert!(first.ranked.windows(2).all(|w| w[0].score >= w[1].score));

        let max = scores.0.iter().cloned().fold(f64::MIN, f64::max);
        let top_index = scores.0.iter().position(|&s| s == max).unwrap();
        prop_assert_eq!(first.top_class, format!("class{}", top_index));
        prop_assert_eq!(first.confidence, max);
    }
}
