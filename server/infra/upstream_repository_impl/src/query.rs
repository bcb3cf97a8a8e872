use domain::models::{ConnectCode, FetchError, ProfileEnvelope, ProfiledUser};
use serde::{Deserialize, Serialize};

const OPERATION_NAME: &str = "AccountManagementPageQuery";

const QUERY: &str = r"fragment profileFields on User {
  displayName
  connectCode { code }
  rankedNetplayProfile {
    ratingOrdinal
    ratingUpdateCount
    wins
    losses
    dailyGlobalPlacement
    dailyRegionalPlacement
    continent
    characters { character gameCount }
  }
}
query AccountManagementPageQuery($cc: String!, $uid: String!) {
  getUser(fbUid: $uid) { ...profileFields }
  getConnectCode(code: $cc) { user { ...profileFields } }
}";

#[derive(Serialize, Debug)]
struct Variables<'a> {
    cc: &'a str,
    uid: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileQuery<'a> {
    operation_name: &'static str,
    query: &'static str,
    variables: Variables<'a>,
}

impl<'a> ProfileQuery<'a> {
    pub(crate) fn for_code(code: &'a ConnectCode) -> Self {
        Self {
            operation_name: OPERATION_NAME,
            query: QUERY,
            variables: Variables {
                cc: code.as_str(),
                uid: code.as_str(),
            },
        }
    }
}

#[derive(Deserialize, Debug)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize, Debug)]
struct GraphQlResponse {
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    get_connect_code: Option<ConnectCodeLookup>,
}

#[derive(Deserialize, Debug)]
struct ConnectCodeLookup {
    user: Option<ProfiledUser>,
}

/// A body without `data` is malformed; `data` with no user or no ranked
/// profile is a valid answer for an unknown or unranked player.
pub(crate) fn parse_profile_response(body: &[u8]) -> Result<ProfileEnvelope, FetchError> {
    let response = serde_json::from_slice::<GraphQlResponse>(body)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

    let Some(data) = response.data else {
        let messages = response
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>();
        return Err(FetchError::MalformedResponse(if messages.is_empty() {
            "response has no data".to_owned()
        } else {
            messages.join("; ")
        }));
    };

    Ok(ProfileEnvelope {
        user: data.get_connect_code.and_then(|lookup| lookup.user),
    })
}
