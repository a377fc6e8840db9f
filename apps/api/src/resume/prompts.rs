// Resume extraction prompt templates.

pub const RESUME_PARSE_SYSTEM: &str = "\
You are an expert resume parser. \
Extract resume content into the exact JSON schema you are given. \
Always include every field of the schema; use an empty string or empty array when a \
value is missing.";

/// `{source_block}` is replaced with the resume text, or with a note that the resume
/// is attached as a document.
pub const RESUME_PARSE_PROMPT: &str = r#"Extract the resume below into this JSON object.

OUTPUT SCHEMA (return exactly this structure):
{
  "personalInfo": {
    "fullName": "", "firstName": "", "middleName": "", "lastName": "",
    "gender": "", "email": "", "phoneNumber": "", "linkedinProfile": "",
    "country": "", "state": "", "city": ""
  },
  "work": {
    "currentStatus": "", "experienceInYears": "", "source": "", "expectedCost": "",
    "skills": [], "currentLocation": "", "currentEmployer": "", "department": "",
    "designation": "", "preferredLocations": []
  },
  "experienceDetails": [
    {
      "organization": "", "designation": "", "country": "", "state": "",
      "employeeType": "", "fromDate": "", "toDate": "", "skillsUsed": []
    }
  ],
  "educationDetails": [
    { "degree": "", "specialization": "", "institution": "", "year": "", "gradeOrScore": "" }
  ],
  "noticePeriod": ""
}

RULES:
1. firstName/middleName/lastName come from the name in the resume header ("Jon Dev Bravo" → Jon / Dev / Bravo).
2. gender only when explicitly stated; otherwise "".
3. email and phoneNumber: the FIRST occurrence in the document.
4. linkedinProfile: the full profile URL.
5. experienceDetails and educationDetails: most recent first.
6. fromDate and toDate: "MM/YYYY". Use "YYYY" when only the year is known. Use "Present" for an ongoing role.
7. employeeType: Full-time, Part-time, Internship, Contract, Freelance or "" when not stated.
8. skillsUsed: concrete skills used in that role only (e.g. Java, React, PostgreSQL), no generic phrases.
9. educationDetails.year: the graduation year "YYYY", or "Present" if still studying.
10. noticePeriod: only if the resume states one (e.g. "30 days"); otherwise "".
11. preferredLocations: only locations the candidate says they want to work in.

{no_invention_instruction}

RESUME:
{source_block}"#;

pub const ATTACHED_DOCUMENT_NOTE: &str = "(The resume is attached as a document.)";
