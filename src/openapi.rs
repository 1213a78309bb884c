use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PlantOps API",
        version = "0.3.0",
        description = r#"
# PlantOps Factory Production API

Backend for factory production management: customers, orders, job orders,
production rolls, machines, raw-material inventory and maintenance.

## Ledgers

- **Production**: every roll mutation recomputes the parent job order's
  produced quantity, waste quantity and production status.
- **Materials**: per-material running balance in kilograms, incremented by
  recorded inputs and consumed atomically by mixes.

## Pagination

List endpoints accept `page` (default 1) and `per_page` (default 20).
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "customers", description = "Customer management"),
        (name = "orders", description = "Order management"),
        (name = "production", description = "Job orders, rolls and waste accounting"),
        (name = "materials", description = "Material inventory and mixes"),
        (name = "machines", description = "Machines and maintenance")
    ),
    paths(
        crate::handlers::customers::create_customer,
        crate::handlers::orders::create_order,
        crate::handlers::job_orders::get_job_order_waste,
        crate::handlers::rolls::get_roll_waste,
        crate::handlers::materials::create_material_input,
        crate::handlers::mixes::create_mix,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,

            crate::services::customers::CreateCustomerRequest,
            crate::services::customers::UpdateCustomerRequest,
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::UpdateOrderRequest,
            crate::services::job_orders::CreateJobOrderRequest,
            crate::services::job_orders::UpdateJobOrderRequest,
            crate::services::rolls::CreateRollRequest,
            crate::services::rolls::UpdateRollRequest,
            crate::services::production::JobOrderTotals,
            crate::services::production::RollWaste,
            crate::services::materials::CreateMaterialRequest,
            crate::services::materials::UpdateMaterialRequest,
            crate::services::materials::CreateMaterialInputRequest,
            crate::services::materials::CreateMixRequest,
            crate::services::materials::MixItemRequest,
            crate::services::machines::CreateMachineRequest,
            crate::services::machines::UpdateMachineRequest,
            crate::services::maintenance::ReportMaintenanceRequest,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
