use gloo_net::http::Request;
use super::fruit::{FruitError, FruitList};

/// GET the fruit list from `url`
pub async fn fetch_fruits(url: &str) -> Result<FruitList, FruitError> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| FruitError::Network(e.to_string()))?;

    if !response.ok() {
        return Err(FruitError::Status(response.status()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| FruitError::Network(e.to_string()))?;
    FruitList::from_json(&body)
}

/// Number of fruits at `url`, or zero if anything goes wrong
pub async fn fetch_fruit_count(url: &str) -> usize {
    count_or_zero(fetch_fruits(url).await)
}

/// Collapse a fetch result to an ornament count; failures become zero
pub fn count_or_zero(result: Result<FruitList, FruitError>) -> usize {
    match result {
        Ok(list) => {
            log::info!("Fetched {} fruits {:?}", list.len(), list.kind_counts());
            list.len()
        }
        Err(e) => {
            log::warn!("No fruit data, showing bare tree: {}", e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_collapse_to_zero() {
        assert_eq!(count_or_zero(Err(FruitError::Network("connection refused".into()))), 0);
        assert_eq!(count_or_zero(Err(FruitError::Status(500))), 0);
        assert_eq!(count_or_zero(FruitList::from_json("not json")), 0);
    }

    #[test]
    fn test_success_counts_records() {
        let body = format!(r#"{{"fruits": [{}]}}"#, vec!["{}"; 16].join(","));
        assert_eq!(count_or_zero(FruitList::from_json(&body)), 16);
    }
}
