//! Request router: maps an authenticated request to one provider call.
//!
//! The `match` in [`serve`] covers every [`RequestType`] with no wildcard
//! arm. Adding a request type without routing it is a compile error.
//! `Login` has no route: the gate consumes it before authentication, so
//! one reaching the router means the gate and the router disagree.

use monocle_protocol::{
    ApiError, Codec, ErrorType, PlayerDetailsRequest, RequestType, Response,
};

use crate::provider::GameStateProvider;

/// Why a request produced no response.
#[derive(Debug, thiserror::Error)]
pub(crate) enum RouteError {
    /// A recoverable failure, sent back to the client.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No route exists for this request type. Never sent to the client.
    #[error("request type {0} has no route")]
    Unroutable(RequestType),
}

/// Serves one request from an authenticated connection.
///
/// `raw` is the full request text; only `PlayerDetails` reads anything
/// besides the discriminator from it.
///
/// # Errors
/// - [`RouteError::Api`]: whatever the provider raised, or
///   `InvalidUserId` for `PlayerDetails` without a usable `userId`
/// - [`RouteError::Unroutable`]: `Login`
pub(crate) fn serve<P, C>(
    provider: &P,
    codec: &C,
    request_type: RequestType,
    raw: &str,
) -> Result<Response, RouteError>
where
    P: GameStateProvider,
    C: Codec,
{
    let response = match request_type {
        RequestType::Players => Response::Players(provider.players()?),
        RequestType::PlayerDetails => {
            let user_id = codec
                .decode::<PlayerDetailsRequest>(raw)
                .ok()
                .and_then(|req| req.user_id())
                .ok_or_else(|| {
                    ApiError::new(
                        ErrorType::InvalidUserId,
                        "The userId was not provided or invalid",
                    )
                })?;
            Response::PlayerInfo(provider.player_details(&user_id)?)
        }
        RequestType::Structures => Response::Structures(provider.structures()?),
        RequestType::Barricades => Response::Barricades(provider.barricades()?),
        RequestType::Vehicles => Response::Vehicles(provider.vehicles()?),
        RequestType::ServerInfo => Response::ServerInfo(provider.server_info()?),
        RequestType::Login => return Err(RouteError::Unroutable(request_type)),
    };

    debug_assert_eq!(response.response_type(), request_type.response_type());
    Ok(response)
}
