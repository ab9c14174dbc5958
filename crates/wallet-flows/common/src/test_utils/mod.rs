pub mod mock_rest_client;
