mod requests;

pub use requests::{
    HealthResponse, LiffExchangeRequest, LoginForm, LoginPageQuery, SessionQuery, SessionResponse,
};
