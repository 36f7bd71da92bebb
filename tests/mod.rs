mod smoke_tests;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the importer:
// - smoke_tests: Config and roster loading, and early aborts of a run
// - google_calendar_mock: Import flow against an in-memory Calendar API
// - google_calendar_api: The REST client against a mock HTTP server
// - token_cache: Cached, refreshed and missing credentials
