/*
 * Responsibility
 * - Router-level layers shared by every route
 * - Authorization is not here: it runs per handler via Authorized<P>
 */
pub mod cors;
pub mod http;
pub mod security_headers;
