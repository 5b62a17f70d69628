/// Base URL of the experimentation API, resolved at build time.
/// Set `EVOLAB_API_URL` when building to point at another deployment.
pub fn api_base() -> &'static str {
    option_env!("EVOLAB_API_URL").unwrap_or("http://localhost:8000/api/v1")
}
