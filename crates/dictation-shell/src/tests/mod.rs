mod preference_store;
