use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use behlog_core::authorization::Permission;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::admin::assignments::{
    __path_assign_role_handler, __path_unassign_role_handler, __path_user_roles_handler,
    assign_role_handler, unassign_role_handler, user_roles_handler, AssignRoleResponse,
    UserRolesResponse,
};
use crate::api::handlers::admin::claims::{
    __path_add_claim_handler, __path_remove_claim_handler, __path_set_claims_handler,
    add_claim_handler, remove_claim_handler, set_claims_handler, AddClaimResponse,
    SetClaimsRequest, SetClaimsResponse,
};
use crate::api::handlers::admin::roles::{
    __path_create_role_handler, __path_delete_role_handler, __path_get_role_handler,
    __path_list_roles_handler, __path_role_users_handler, create_role_handler,
    delete_role_handler, get_role_handler, list_roles_handler, role_users_handler,
    CreateRoleRequest, RoleUsersResponse, RoleWithUserCount, RolesListResponse,
};
use crate::api::handlers::admin::{ClaimInfo, RoleInfo};
use crate::api::handlers::health::{__path_health_checker_handler, health_checker_handler};
use crate::api::handlers::me::{
    __path_my_permissions_handler, my_permissions_handler, MyPermissionsResponse,
};
use crate::app_state::SharedAppState;

use super::auth::auth;
use super::middleware::authorization::require_permission;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_checker_handler,
        my_permissions_handler,
        list_roles_handler,
        create_role_handler,
        get_role_handler,
        delete_role_handler,
        role_users_handler,
        add_claim_handler,
        remove_claim_handler,
        set_claims_handler,
        user_roles_handler,
        assign_role_handler,
        unassign_role_handler,
    ),
    components(
        schemas(
            ClaimInfo, RoleInfo, RoleWithUserCount, RolesListResponse, CreateRoleRequest,
            RoleUsersResponse, AddClaimResponse, SetClaimsRequest, SetClaimsResponse,
            UserRolesResponse, AssignRoleResponse, MyPermissionsResponse
        )
    ),
    tags(
        (name = "behlog", description = "behlog access control api")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

pub struct ApiRoutes;

impl ApiRoutes {
    pub fn create(state: SharedAppState) -> Router {
        let api = ApiDoc::openapi();

        let authenticated_router = Router::new()
            .route(
                "/api/v1/authenticated/me/permissions",
                get(my_permissions_handler),
            )
            .route(
                "/api/v1/authenticated/admin/roles",
                get(list_roles_handler)
                    .layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_permission(Permission::RoleView),
                    ))
                    .merge(
                        post(create_role_handler)
                            .layer(middleware::from_fn_with_state(
                                state.clone(),
                                require_permission(Permission::RoleManage),
                            )),
                    ),
            )
            .route(
                "/api/v1/authenticated/admin/roles/{role_id}",
                get(get_role_handler)
                    .layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_permission(Permission::RoleView),
                    ))
                    .merge(
                        delete(delete_role_handler)
                            .layer(middleware::from_fn_with_state(
                                state.clone(),
                                require_permission(Permission::RoleManage),
                            )),
                    ),
            )
            .route(
                "/api/v1/authenticated/admin/roles/{role_id}/users",
                get(role_users_handler)
                    .layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_permission(Permission::RoleView),
                    )),
            )
            .route(
                "/api/v1/authenticated/admin/roles/{role_id}/claims",
                post(add_claim_handler)
                    .delete(remove_claim_handler)
                    .layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_permission(Permission::RoleManage),
                    )),
            )
            .route(
                "/api/v1/authenticated/admin/roles/{role_id}/claims/{claim_type}",
                put(set_claims_handler)
                    .layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_permission(Permission::RoleManage),
                    )),
            )
            .route(
                "/api/v1/authenticated/admin/users/{user_id}/roles",
                get(user_roles_handler)
                    .layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_permission(Permission::UserManageRoles),
                    )),
            )
            .route(
                "/api/v1/authenticated/admin/users/{user_id}/roles/{role_id}",
                post(assign_role_handler)
                    .delete(unassign_role_handler)
                    .layer(middleware::from_fn_with_state(
                        state.clone(),
                        require_permission(Permission::UserManageRoles),
                    )),
            )
            .route_layer(middleware::from_fn_with_state(state.clone(), auth));

        let public_router = Router::new()
            .route("/api/v1/health", get(health_checker_handler))
            .route(
                "/api-docs/openapi.json",
                get(move || async move { Json(api) }),
            );

        Router::new()
            .merge(authenticated_router)
            .merge(public_router)
            .with_state(state)
    }
}
