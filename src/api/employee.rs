use crate::{
    error::ApiError,
    model::employee::Employee,
    store::{EMPLOYEE_CODE_KEY, EMPLOYEE_EMAIL_KEY, HrStore, StoreError},
    validation::validate_new_employee,
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use utoipa::ToSchema;

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    #[schema(example = "John Doe")]
    pub full_name: String,
    #[schema(example = "john@email.com", format = "email")]
    pub email: String,
    #[schema(example = "Engineering")]
    pub department: String,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub employees: Vec<Employee>,
    #[schema(example = 1)]
    pub count: usize,
}

/// Add Employee
#[utoipa::path(
    post,
    path = "/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee added successfully", body = Object, example = json!({
            "message": "Employee added successfully",
            "data": {
                "id": "0b6f3c9e-8f0d-4c55-9d0e-2f3c1a7b9e21",
                "employee_id": "EMP-001",
                "full_name": "John Doe",
                "email": "john@email.com",
                "department": "Engineering",
                "created_at": "2026-01-01T09:00:00Z"
            }
        })),
        (status = 409, description = "Employee ID or email already exists", body = Object, example = json!({
            "message": "Employee ID 'EMP-001' already exists"
        })),
        (status = 422, description = "Invalid field"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn add_employee(
    store: web::Data<dyn HrStore>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    let employee = validate_new_employee(payload.into_inner())?;
    let code = employee.employee_id.clone();
    let email = employee.email.clone();

    match store.insert_employee(employee).await {
        Ok(created) => {
            info!(employee_id = %created.employee_id, id = %created.id, "Employee added");
            Ok(HttpResponse::Created().json(json!({
                "message": "Employee added successfully",
                "data": created
            })))
        }
        Err(StoreError::UniqueViolation {
            constraint,
            message,
        }) => {
            debug!(?constraint, employee_id = %code, "Duplicate employee");
            Err(ApiError::Conflict(match constraint.as_deref() {
                Some(EMPLOYEE_CODE_KEY) => format!("Employee ID '{code}' already exists"),
                Some(EMPLOYEE_EMAIL_KEY) => format!("Email '{email}' already exists"),
                _ => format!("Conflict: {message}"),
            }))
        }
        Err(e) => Err(ApiError::internal("Internal server error", e)),
    }
}

/// List Employees
#[utoipa::path(
    get,
    path = "/employees",
    responses(
        (status = 200, description = "All employees, newest first", body = EmployeeListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn list_employees(store: web::Data<dyn HrStore>) -> Result<HttpResponse, ApiError> {
    let employees = store
        .list_employees()
        .await
        .map_err(|e| ApiError::internal("Error fetching employees", e))?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        count: employees.len(),
        employees,
    }))
}

/// Get Employee by employee code
#[utoipa::path(
    get,
    path = "/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "External employee code")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    store: web::Data<dyn HrStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let code = path.into_inner();

    let employee = store
        .find_employee_by_code(&code)
        .await
        .map_err(|e| ApiError::internal("Error fetching employee", e))?
        .ok_or_else(|| ApiError::not_found("Employee"))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee by internal id
#[utoipa::path(
    delete,
    path = "/employees/{id}",
    params(
        ("id", Path, description = "Internal employee id")
    ),
    responses(
        (status = 200, description = "Employee deleted", body = Object, example = json!({
            "message": "Employee deleted successfully"
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    store: web::Data<dyn HrStore>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let deleted = store
        .delete_employee(&id)
        .await
        .map_err(|e| ApiError::internal("Error deleting employee", e))?;

    if !deleted {
        return Err(ApiError::not_found("Employee"));
    }

    info!(id = %id, "Employee deleted");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully"
    })))
}

#[cfg(test)]
mod tests {
    use crate::{
        routes,
        store::{HrStore, memory::MemoryStore},
    };
    use actix_web::{App, http::StatusCode, test, web};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn store() -> web::Data<dyn HrStore> {
        let store: Arc<dyn HrStore> = Arc::new(MemoryStore::default());
        web::Data::from(store)
    }

    fn employee(code: &str, email: &str) -> Value {
        json!({
            "employee_id": code,
            "full_name": format!("Employee {code}"),
            "email": email,
            "department": "Engineering"
        })
    }

    #[actix_web::test]
    async fn add_then_get_by_code() {
        let app =
            test::init_service(App::new().app_data(store()).configure(routes::configure)).await;

        let req = test::TestRequest::post()
            .uri("/employees")
            .set_json(json!({
                "employee_id": " EMP-1 ",
                "full_name": " Grace Hopper ",
                "email": "grace@navy.mil",
                "department": "Compilers"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Employee added successfully");
        assert_eq!(body["data"]["employee_id"], "EMP-1");
        assert_eq!(body["data"]["full_name"], "Grace Hopper");

        let req = test::TestRequest::get().uri("/employees/EMP-1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["email"], "grace@navy.mil");
    }

    #[actix_web::test]
    async fn duplicate_code_or_email_is_conflict() {
        let app =
            test::init_service(App::new().app_data(store()).configure(routes::configure)).await;

        let req = test::TestRequest::post()
            .uri("/employees")
            .set_json(employee("EMP-1", "one@x.io"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/employees")
            .set_json(employee("EMP-1", "other@x.io"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Employee ID 'EMP-1' already exists");

        let req = test::TestRequest::post()
            .uri("/employees")
            .set_json(employee("EMP-2", "one@x.io"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Email 'one@x.io' already exists");
    }

    #[actix_web::test]
    async fn invalid_fields_are_unprocessable() {
        let app =
            test::init_service(App::new().app_data(store()).configure(routes::configure)).await;

        let req = test::TestRequest::post()
            .uri("/employees")
            .set_json(employee("EMP-1", "not-an-email"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let req = test::TestRequest::post()
            .uri("/employees")
            .set_json(employee("   ", "ok@x.io"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        // missing field never reaches validation
        let req = test::TestRequest::post()
            .uri("/employees")
            .set_json(json!({ "employee_id": "EMP-1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].is_string());
    }

    #[actix_web::test]
    async fn list_reports_count_newest_first() {
        let app =
            test::init_service(App::new().app_data(store()).configure(routes::configure)).await;

        for (code, email) in [("EMP-1", "a@x.io"), ("EMP-2", "b@x.io")] {
            let req = test::TestRequest::post()
                .uri("/employees")
                .set_json(employee(code, email))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get().uri("/employees").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["employees"][0]["employee_id"], "EMP-2");
        assert_eq!(body["employees"][1]["employee_id"], "EMP-1");
    }

    #[actix_web::test]
    async fn unknown_employee_is_not_found() {
        let app =
            test::init_service(App::new().app_data(store()).configure(routes::configure)).await;

        let req = test::TestRequest::get().uri("/employees/NOPE").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Employee not found");

        let req = test::TestRequest::delete()
            .uri("/employees/00000000-0000-0000-0000-000000000000")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn delete_uses_internal_id() {
        let app =
            test::init_service(App::new().app_data(store()).configure(routes::configure)).await;

        let req = test::TestRequest::post()
            .uri("/employees")
            .set_json(employee("EMP-1", "a@x.io"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        // the external code is not a delete key
        let req = test::TestRequest::delete().uri("/employees/EMP-1").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete()
            .uri(&format!("/employees/{id}"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Employee deleted successfully");

        let req = test::TestRequest::get().uri("/employees/EMP-1").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
