//! The fixed GraphQL request sent for every zip code.

use serde::Serialize;

pub const DEFAULT_ENDPOINT: &str = "https://www.gasbuddy.com/graphql";

pub const OPERATION_NAME: &str = "LocationBySearchTerm";

pub const LOCATION_QUERY: &str = r#"
query LocationBySearchTerm($search: String) {
    locationBySearchTerm(search: $search) {
        stations {
            results {
                id
                name
                latitude
                longitude
                address {
                    line1
                }
                prices {
                    fuelProduct
                    credit {
                        price
                        postedTime
                    }
                }
            }
        }
    }
}
"#;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<'a> {
    operation_name: &'a str,
    variables: SearchVariables<'a>,
    query: &'a str,
}

#[derive(Debug, Serialize)]
struct SearchVariables<'a> {
    search: &'a str,
}

impl<'a> GraphQlRequest<'a> {
    /// Station search with `zip` as the only variable.
    pub fn location_search(zip: &'a str) -> Self {
        Self {
            operation_name: OPERATION_NAME,
            variables: SearchVariables { search: zip },
            query: LOCATION_QUERY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_location_search_body_shape() {
        let body = serde_json::to_value(GraphQlRequest::location_search("07305")).unwrap();

        assert_eq!(body["operationName"], json!("LocationBySearchTerm"));
        assert_eq!(body["variables"], json!({ "search": "07305" }));
        assert_eq!(body["query"], json!(LOCATION_QUERY));
        assert_eq!(body.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_query_selects_coordinates() {
        assert!(LOCATION_QUERY.contains("latitude"));
        assert!(LOCATION_QUERY.contains("longitude"));
        assert!(LOCATION_QUERY.contains("postedTime"));
    }
}
