/// Cosine similarity of two vectors of equal length
///
/// Equals `1 - cosine_distance(u, v)`, i.e. the dot product of the normalized
/// vectors. A zero vector has no direction, so any comparison involving one
/// scores 0.
pub fn cosine_similarity(u: &[f64], v: &[f64]) -> f64 {
    debug_assert_eq!(u.len(), v.len(), "vectors must share a dimension");

    let norm_u = norm(u);
    let norm_v = norm(v);
    if norm_u == 0.0 || norm_v == 0.0 {
        return 0.0;
    }

    let dot: f64 = u.iter().zip(v).map(|(a, b)| a * b).sum();
    dot / (norm_u * norm_v)
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_identical_vectors() {
        let u = [10.0, 1.0, 5.0, 5.0];
        assert!((cosine_similarity(&u, &u) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_proportional_vectors() {
        let u = [1.0, 2.0, 3.0];
        let v = [2.0, 4.0, 6.0];
        assert!((cosine_similarity(&u, &v) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_symmetry() {
        let u = [9.0, 1.0, 4.0, 7.5];
        let v = [2.0, 8.0, 5.0, 3.0];
        assert_eq!(cosine_similarity(&u, &v), cosine_similarity(&v, &u));
    }

    #[test]
    fn test_self_similarity_is_maximal() {
        let u = [9.0, 1.0, 4.0];
        let candidates = [[1.0, 9.0, 4.0], [9.0, 2.0, 4.0], [5.0, 5.0, 5.0]];
        let self_sim = cosine_similarity(&u, &u);
        for v in candidates {
            assert!(self_sim + EPS >= cosine_similarity(&u, &v));
        }
    }

    #[test]
    fn test_orthogonal_vectors() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < EPS);
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        let zero = [0.0, 0.0, 0.0];
        let v = [3.0, 4.0, 5.0];
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_empty_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
