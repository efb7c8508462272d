use crate::error::BracketError;

/// Seeds are 1-based ranks which must be unique and dense: a seed list for N
/// participants is exactly the set {1, ..., N}.
pub fn check_dense_seeds(seeds: &[i64]) -> Result<(), BracketError> {
    let mut sorted = seeds.to_vec();
    sorted.sort_unstable();

    for (i, seed) in sorted.iter().enumerate() {
        let expected = (i + 1) as i64;
        if *seed != expected {
            return Err(BracketError::NonContiguousSeeds(format!(
                "expected seed {expected}, found {seed}"
            )));
        }
    }

    Ok(())
}

pub fn check_score(score: i64) -> Result<(), BracketError> {
    if score < 0 {
        return Err(BracketError::InvalidScore(format!(
            "scores must be non-negative, got {score}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_seeds() {
        assert!(check_dense_seeds(&[1, 2, 3]).is_ok());
        assert!(check_dense_seeds(&[3, 1, 2]).is_ok());
        assert!(check_dense_seeds(&[]).is_ok());
        assert!(check_dense_seeds(&[1, 3, 4]).is_err());
        assert!(check_dense_seeds(&[0, 1, 2]).is_err());
        assert!(check_dense_seeds(&[1, 2, 2]).is_err());
    }

    #[test]
    fn negative_score_rejected() {
        assert!(check_score(0).is_ok());
        assert!(check_score(10).is_ok());
        assert!(check_score(-1).is_err());
    }
}
